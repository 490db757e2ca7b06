//! Built-in dashboard definitions, one module per dashboard.

pub mod ipmi;
pub mod papermc;

use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::error::Result;

/// Built-in dashboard names, in display order.
pub const DASHBOARDS: &[&str] = &["papermc", "ipmi"];

/// Get a built-in dashboard definition by name.
pub fn get_dashboard(name: &str, settings: &Settings) -> Option<Result<Dashboard>> {
    match name {
        "papermc" => Some(papermc::dashboard(settings)),
        "ipmi" => Some(ipmi::dashboard(settings)),
        _ => None,
    }
}
