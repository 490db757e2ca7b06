use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which backend family a query expression targets.
///
/// The kind never appears in the serialized document; it exists so that a log
/// viewer cannot be wired to a metrics query and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    Metric,
    Log,
}

/// Names the backend a query or panel reads from, either a literal uid or a
/// `"${name}"` variable reference. References are passed through verbatim;
/// substitution happens in the platform at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    pub uid: String,
}

impl DatasourceRef {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// One datasource target: an opaque expression plus an optional legend
/// template with `{{label}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub expr: String,
    #[serde(rename = "legendFormat", skip_serializing_if = "Option::is_none")]
    pub legend_format: Option<String>,
    #[serde(skip)]
    pub source: SourceKind,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }
}

/// Builder for a single query target. The expression is opaque text owned by
/// the monitoring platform; nothing here parses or checks its syntax.
#[derive(Default)]
pub struct QueryBuilder {
    expr: String,
    legend_format: Option<String>,
    source: SourceKind,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = expr.into();
        self
    }

    pub fn legend_format(mut self, legend: impl Into<String>) -> Self {
        self.legend_format = Some(legend.into());
        self
    }

    pub fn source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    pub fn build(self) -> Result<Query> {
        if self.expr.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "query expression is empty".to_string(),
            ));
        }

        Ok(Query {
            expr: self.expr,
            legend_format: self.legend_format,
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_expression_is_rejected() {
        let result = Query::builder().legend_format("Total").build();
        assert!(matches!(result, Err(Error::IncompleteConfiguration(_))));
    }

    #[test]
    fn legend_and_source_are_optional() {
        let query = Query::builder().expr("up").build().unwrap();
        assert_eq!(query.expr, "up");
        assert_eq!(query.legend_format, None);
        assert_eq!(query.source, SourceKind::Metric);
    }

    #[test]
    fn log_queries_keep_their_source_kind() {
        let query = Query::builder()
            .expr("{namespace=\"paper\"}")
            .source(SourceKind::Log)
            .build()
            .unwrap();
        assert_eq!(query.source, SourceKind::Log);
    }

    #[test]
    fn serialized_target_carries_expr_and_legend_only() {
        let query = Query::builder()
            .expr("mc_tps")
            .legend_format("TPS")
            .build()
            .unwrap();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"expr": "mc_tps", "legendFormat": "TPS"})
        );
    }
}
