use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::query::{DatasourceRef, Query};
use crate::error::{Error, Result};

/// What a template variable expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Datasource,
    Query,
    Constant,
}

/// When the platform re-evaluates a variable's candidate values. Encoded as
/// an integer in the document, matching the platform schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    #[default]
    Never,
    OnDashboardLoad,
    OnTimeRangeChange,
}

impl Serialize for RefreshPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for RefreshPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Never),
            1 => Ok(Self::OnDashboardLoad),
            2 => Ok(Self::OnTimeRangeChange),
            other => Err(D::Error::custom(format!("unknown refresh policy {other}"))),
        }
    }
}

/// A dashboard-scoped placeholder the platform substitutes at render time.
///
/// The serialized `query` field is overloaded by the platform schema: query
/// variables put their expression there, datasource variables the backend
/// plugin type, constant variables their value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DatasourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub multi: bool,
    #[serde(rename = "includeAll")]
    pub include_all: bool,
    pub refresh: RefreshPolicy,
}

impl Variable {
    pub fn builder(name: impl Into<String>) -> VariableBuilder {
        VariableBuilder::new(name)
    }
}

/// Single-use builder for one template variable.
///
/// Name uniqueness is not checked here; the dashboard enforces it when the
/// variable is attached.
pub struct VariableBuilder {
    name: String,
    label: Option<String>,
    kind: VariableKind,
    datasource: Option<DatasourceRef>,
    query: Option<String>,
    plugin_type: Option<String>,
    value: Option<String>,
    multi: bool,
    include_all: bool,
    refresh: RefreshPolicy,
}

impl VariableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: VariableKind::Query,
            datasource: None,
            query: None,
            plugin_type: None,
            value: None,
            multi: false,
            include_all: false,
            refresh: RefreshPolicy::Never,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(mut self, kind: VariableKind) -> Self {
        self.kind = kind;
        self
    }

    /// The backend the variable's query runs against; may itself be a
    /// `"${other}"` reference.
    pub fn datasource(mut self, uid: impl Into<String>) -> Self {
        self.datasource = Some(DatasourceRef::new(uid));
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query.expr);
        self
    }

    /// Backend plugin type offered by a datasource variable, e.g.
    /// `"prometheus"` or `"loki"`.
    pub fn plugin_type(mut self, plugin: impl Into<String>) -> Self {
        self.plugin_type = Some(plugin.into());
        self
    }

    /// Fixed value of a constant variable.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }

    pub fn refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn build(self) -> Result<Variable> {
        if self.name.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "variable name is empty".to_string(),
            ));
        }
        let query = match self.kind {
            VariableKind::Query => match self.query {
                Some(query) => Some(query),
                None => {
                    return Err(Error::IncompleteConfiguration(format!(
                        "query variable \"{}\" has no query",
                        self.name
                    )))
                }
            },
            VariableKind::Datasource => self.plugin_type,
            VariableKind::Constant => self.value,
        };

        Ok(Variable {
            name: self.name,
            label: self.label,
            kind: self.kind,
            datasource: self.datasource,
            query,
            multi: self.multi,
            include_all: self.include_all,
            refresh: self.refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_query() -> Query {
        Query::builder()
            .expr("label_values(mc_tps, pod)")
            .build()
            .unwrap()
    }

    #[test]
    fn query_variable_requires_a_query() {
        let result = VariableBuilder::new("pod").build();
        assert!(matches!(result, Err(Error::IncompleteConfiguration(_))));

        let variable = VariableBuilder::new("pod")
            .label("Pod")
            .datasource("${datasource}")
            .query(pod_query())
            .refresh(RefreshPolicy::OnDashboardLoad)
            .build()
            .unwrap();
        assert_eq!(variable.query.as_deref(), Some("label_values(mc_tps, pod)"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = VariableBuilder::new("").query(pod_query()).build();
        assert!(matches!(result, Err(Error::IncompleteConfiguration(_))));
    }

    #[test]
    fn datasource_variable_serializes_plugin_type_as_query() {
        let variable = VariableBuilder::new("datasource")
            .kind(VariableKind::Datasource)
            .label("Prometheus")
            .plugin_type("prometheus")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&variable).unwrap(),
            json!({
                "name": "datasource",
                "label": "Prometheus",
                "type": "datasource",
                "query": "prometheus",
                "multi": false,
                "includeAll": false,
                "refresh": 0
            })
        );
    }

    #[test]
    fn constant_variable_serializes_its_value() {
        let variable = VariableBuilder::new("namespace")
            .kind(VariableKind::Constant)
            .value("paper")
            .build()
            .unwrap();
        let doc = serde_json::to_value(&variable).unwrap();
        assert_eq!(doc["type"], "constant");
        assert_eq!(doc["query"], "paper");
    }

    #[test]
    fn multi_select_query_variable_round_trips() {
        let variable = VariableBuilder::new("instance")
            .label("Instance")
            .datasource("${datasource}")
            .query(
                Query::builder()
                    .expr("label_values(ipmi_bmc_info, instance)")
                    .build()
                    .unwrap(),
            )
            .multi(true)
            .include_all(true)
            .refresh(RefreshPolicy::OnDashboardLoad)
            .build()
            .unwrap();
        let doc = serde_json::to_string(&variable).unwrap();
        let back: Variable = serde_json::from_str(&doc).unwrap();
        assert_eq!(back, variable);
        assert_eq!(back.refresh, RefreshPolicy::OnDashboardLoad);
    }
}
