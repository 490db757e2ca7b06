//! The dashboard entity graph and its builders.
//!
//! Construction flows strictly upward: queries feed panels, panels and
//! variables feed the dashboard, the finished dashboard feeds the serializer.
//! Each dashboard is assembled independently in a single pass and owns its
//! variables and panels exclusively.

pub mod layout;
pub mod panel;
pub mod query;
pub mod serialize;
pub mod variable;

pub use layout::{GridRect, GRID_COLUMNS};
pub use panel::{Panel, PanelBuilder, PanelKind};
pub use query::{DatasourceRef, Query, QueryBuilder, SourceKind};
pub use variable::{RefreshPolicy, Variable, VariableBuilder, VariableKind};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A finished dashboard document: metadata, template variables, and panels,
/// in the field order the platform schema expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub refresh: String,
    pub templating: Templating,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Templating {
    pub variables: Vec<Variable>,
}

impl Dashboard {
    pub fn builder(title: impl Into<String>) -> DashboardBuilder {
        DashboardBuilder::new(title)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.templating.variables
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Building,
    Finalized,
}

/// Accumulates variables and panels, then validates once and emits the
/// immutable document.
///
/// The builder is a two-state machine: every mutator requires `Building`,
/// and a successful `build` moves it to `Finalized`, after which any further
/// call fails with [`Error::InvalidState`]. Mutators return `&mut Self` so
/// calls chain with `?`.
#[derive(Debug)]
pub struct DashboardBuilder {
    state: State,
    title: String,
    description: String,
    tags: Vec<String>,
    timezone: String,
    refresh: String,
    variables: Vec<Variable>,
    panels: Vec<Panel>,
}

impl DashboardBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: State::Building,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            timezone: String::new(),
            refresh: String::new(),
            variables: Vec::new(),
            panels: Vec::new(),
        }
    }

    fn guard(&self, op: &'static str) -> Result<()> {
        match self.state {
            State::Building => Ok(()),
            State::Finalized => Err(Error::InvalidState(op)),
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.guard("title")?;
        self.title = title.into();
        Ok(self)
    }

    pub fn description(&mut self, description: impl Into<String>) -> Result<&mut Self> {
        self.guard("description")?;
        self.description = description.into();
        Ok(self)
    }

    /// Replaces the tag set.
    pub fn tags<I, S>(&mut self, tags: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guard("tags")?;
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        Ok(self)
    }

    /// Adds one tag; already-present tags are ignored.
    pub fn tag(&mut self, tag: impl Into<String>) -> Result<&mut Self> {
        self.guard("tag")?;
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        Ok(self)
    }

    pub fn timezone(&mut self, timezone: impl Into<String>) -> Result<&mut Self> {
        self.guard("timezone")?;
        self.timezone = timezone.into();
        Ok(self)
    }

    /// Auto-refresh interval as a duration string, e.g. `"30s"` or `"1m"`.
    /// Validated at build time; empty means auto-refresh is off.
    pub fn refresh(&mut self, refresh: impl Into<String>) -> Result<&mut Self> {
        self.guard("refresh")?;
        self.refresh = refresh.into();
        Ok(self)
    }

    /// Attaches a variable. Names must be unique within the dashboard; a
    /// duplicate is rejected whole, leaving the variable set untouched.
    pub fn variable(&mut self, variable: Variable) -> Result<&mut Self> {
        self.guard("variable")?;
        if self.variables.iter().any(|v| v.name == variable.name) {
            return Err(Error::DuplicateVariableName(variable.name));
        }
        self.variables.push(variable);
        Ok(self)
    }

    /// Attaches a panel. Attach order is render order.
    pub fn panel(&mut self, panel: Panel) -> Result<&mut Self> {
        self.guard("panel")?;
        self.panels.push(panel);
        Ok(self)
    }

    /// Validates and finalizes. On success the builder is spent; on failure
    /// it stays in `Building` and reports the same defect again, since
    /// nothing about its inputs can have changed for the better.
    pub fn build(&mut self) -> Result<Dashboard> {
        self.guard("build")?;
        if self.title.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "dashboard title is empty".to_string(),
            ));
        }
        if !self.refresh.is_empty() {
            humantime::parse_duration(&self.refresh).map_err(|e| {
                Error::IncompleteConfiguration(format!(
                    "refresh interval \"{}\" is not a duration: {e}",
                    self.refresh
                ))
            })?;
        }
        layout::validate(&self.panels)?;

        self.state = State::Finalized;
        Ok(Dashboard {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            timezone: self.timezone.clone(),
            refresh: self.refresh.clone(),
            templating: Templating {
                variables: self.variables.clone(),
            },
            panels: self.panels.clone(),
        })
    }
}
