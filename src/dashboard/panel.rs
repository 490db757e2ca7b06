use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::GridRect;
use super::query::{DatasourceRef, Query, SourceKind};
use crate::error::{Error, Result};

/// Visualization kinds understood by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Stat,
    Gauge,
    TimeSeries,
    #[serde(rename = "logs")]
    LogView,
}

/// Display override for one raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    Value,
}

/// A value-to-text mapping block under `fieldConfig.defaults.mappings`.
/// Options are keyed by the raw value string; BTreeMap keeps the serialized
/// key order stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMapping {
    #[serde(rename = "type")]
    pub kind: MappingKind,
    pub options: BTreeMap<String, MappingResult>,
}

/// Unit, bounds, and value mappings applied to every field the panel renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ValueMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub defaults: FieldDefaults,
}

/// Panel-level rendering options. Only log viewers use these today.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelOptions {
    #[serde(rename = "showTime", skip_serializing_if = "Option::is_none")]
    pub show_time: Option<bool>,
    #[serde(rename = "wrapLogMessage", skip_serializing_if = "Option::is_none")]
    pub wrap_log_message: Option<bool>,
}

impl PanelOptions {
    fn is_empty(&self) -> bool {
        self.show_time.is_none() && self.wrap_log_message.is_none()
    }
}

/// One visual tile: a title, a visualization kind, the queries feeding it,
/// and its rectangle on the canvas. Owned exclusively by one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    pub datasource: DatasourceRef,
    pub targets: Vec<Query>,
    #[serde(rename = "fieldConfig", skip_serializing_if = "Option::is_none")]
    pub field_config: Option<FieldConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<PanelOptions>,
    #[serde(rename = "gridPos")]
    pub grid_pos: GridRect,
}

impl Panel {
    pub fn builder() -> PanelBuilder {
        PanelBuilder::new()
    }
}

/// Single-use builder for one panel; `build` consumes it.
///
/// Query order is preserved: the order of `target` calls is the legend and
/// series order in the rendered chart.
#[derive(Default)]
pub struct PanelBuilder {
    title: String,
    description: Option<String>,
    kind: Option<PanelKind>,
    datasource: Option<DatasourceRef>,
    targets: Vec<Query>,
    unit: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    mappings: BTreeMap<String, MappingResult>,
    options: PanelOptions,
    grid_pos: GridRect,
}

impl PanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// There is no default visualization kind; a panel that never picks one
    /// fails to build.
    pub fn kind(mut self, kind: PanelKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn datasource(mut self, uid: impl Into<String>) -> Self {
        self.datasource = Some(DatasourceRef::new(uid));
        self
    }

    pub fn target(mut self, query: Query) -> Self {
        self.targets.push(query);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Maps a raw value to replacement text and a color. Re-mapping the same
    /// raw value overwrites the earlier entry.
    pub fn value_mapping(
        mut self,
        raw: impl Into<String>,
        text: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        self.mappings.insert(
            raw.into(),
            MappingResult {
                text: text.into(),
                color: color.into(),
            },
        );
        self
    }

    pub fn show_time(mut self, show: bool) -> Self {
        self.options.show_time = Some(show);
        self
    }

    pub fn wrap_log_message(mut self, wrap: bool) -> Self {
        self.options.wrap_log_message = Some(wrap);
        self
    }

    pub fn grid_pos(mut self, h: u32, w: u32, x: u32, y: u32) -> Self {
        self.grid_pos = GridRect::new(h, w, x, y);
        self
    }

    pub fn build(self) -> Result<Panel> {
        if self.title.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "panel title is empty".to_string(),
            ));
        }
        let kind = self.kind.ok_or_else(|| {
            Error::IncompleteConfiguration(format!(
                "panel \"{}\" has no visualization kind",
                self.title
            ))
        })?;
        let datasource = match self.datasource {
            Some(datasource) if !datasource.uid.is_empty() => datasource,
            _ => {
                return Err(Error::IncompleteConfiguration(format!(
                    "panel \"{}\" has no datasource",
                    self.title
                )))
            }
        };
        if self.targets.is_empty() {
            return Err(Error::IncompleteConfiguration(format!(
                "panel \"{}\" has no queries",
                self.title
            )));
        }
        let expected = match kind {
            PanelKind::LogView => SourceKind::Log,
            _ => SourceKind::Metric,
        };
        if self.targets.iter().any(|query| query.source != expected) {
            let wanted = match expected {
                SourceKind::Log => "log",
                SourceKind::Metric => "metric",
            };
            return Err(Error::IncompleteConfiguration(format!(
                "panel \"{}\" accepts only {wanted} queries",
                self.title
            )));
        }

        let panel = Panel {
            title: self.title,
            description: self.description,
            kind,
            datasource,
            targets: self.targets,
            field_config: field_config(self.unit, self.min, self.max, self.mappings),
            options: if self.options.is_empty() {
                None
            } else {
                Some(self.options)
            },
            grid_pos: self.grid_pos,
        };

        super::layout::validate(std::slice::from_ref(&panel))?;
        Ok(panel)
    }
}

fn field_config(
    unit: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    mappings: BTreeMap<String, MappingResult>,
) -> Option<FieldConfig> {
    if unit.is_none() && min.is_none() && max.is_none() && mappings.is_empty() {
        return None;
    }
    let mappings = if mappings.is_empty() {
        Vec::new()
    } else {
        vec![ValueMapping {
            kind: MappingKind::Value,
            options: mappings,
        }]
    };
    Some(FieldConfig {
        defaults: FieldDefaults {
            unit,
            min,
            max,
            mappings,
        },
    })
}
