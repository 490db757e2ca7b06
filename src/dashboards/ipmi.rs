//! IPMI hardware monitoring, fed by prometheus-ipmi-exporter.

use crate::config::Settings;
use crate::dashboard::{
    Dashboard, PanelBuilder, PanelKind, Query, QueryBuilder, RefreshPolicy, VariableBuilder,
    VariableKind,
};
use crate::error::Result;

fn metric(expr: &str, legend: &str) -> Result<Query> {
    QueryBuilder::new().expr(expr).legend_format(legend).build()
}

pub fn dashboard(settings: &Settings) -> Result<Dashboard> {
    let metrics = settings.datasources.metrics.as_str();

    let mut builder = Dashboard::builder("IPMI Hardware Monitoring");
    builder
        .description("Hardware metrics from prometheus-ipmi-exporter")?
        .tags(["ipmi", "hardware", "monitoring"])?
        .timezone(settings.timezone())?
        .refresh(settings.refresh_or("1m"))?;
    for tag in &settings.tags {
        builder.tag(tag.as_str())?;
    }

    builder
        .variable(
            VariableBuilder::new("datasource")
                .kind(VariableKind::Datasource)
                .label("Datasource")
                .build()?,
        )?
        .variable(
            VariableBuilder::new("instance")
                .label("Instance")
                .datasource(metrics)
                .query(
                    QueryBuilder::new()
                        .expr("label_values(ipmi_bmc_info, instance)")
                        .build()?,
                )
                .multi(true)
                .include_all(true)
                .refresh(RefreshPolicy::OnDashboardLoad)
                .build()?,
        )?;

    builder
        .panel(
            PanelBuilder::new()
                .title("BMC Firmware")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric(
                    "ipmi_bmc_info{instance=~\"$instance\"}",
                    "{{firmware_revision}}",
                )?)
                .grid_pos(4, 6, 0, 1)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Power State")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(
                    QueryBuilder::new()
                        .expr("ipmi_chassis_power_state{instance=~\"$instance\"}")
                        .build()?,
                )
                .value_mapping("1", "ON", "green")
                .value_mapping("0", "OFF", "red")
                .grid_pos(4, 6, 6, 1)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Temperatures")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "ipmi_temperature_celsius{instance=~\"$instance\"}",
                    "{{name}}",
                )?)
                .unit("celsius")
                .grid_pos(8, 24, 0, 6)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Fan Speeds (RPM)")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric("ipmi_fan_speed_rpm{instance=~\"$instance\"}", "{{name}}")?)
                .unit("rpm")
                .grid_pos(8, 12, 0, 14)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Fan Speed Ratio")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "ipmi_fan_speed_ratio{instance=~\"$instance\"}",
                    "{{name}}",
                )?)
                .unit("percentunit")
                .bounds(0.0, 1.0)
                .grid_pos(8, 12, 12, 14)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Voltage")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric("ipmi_voltage_volts{instance=~\"$instance\"}", "{{name}}")?)
                .unit("volt")
                .grid_pos(8, 12, 0, 22)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Power Consumption (DCMI)")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "ipmi_dcmi_power_consumption_watts{instance=~\"$instance\"}",
                    "Current",
                )?)
                .unit("watt")
                .grid_pos(8, 12, 12, 22)
                .build()?,
        )?;

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_settings() {
        let dashboard = dashboard(&Settings::default()).unwrap();
        assert_eq!(dashboard.title, "IPMI Hardware Monitoring");
        assert_eq!(dashboard.refresh, "1m");
        assert_eq!(dashboard.variables().len(), 2);
        assert_eq!(dashboard.panels.len(), 7);

        let instance = &dashboard.variables()[1];
        assert!(instance.multi);
        assert!(instance.include_all);
        assert_eq!(instance.refresh, RefreshPolicy::OnDashboardLoad);
    }

    #[test]
    fn datasource_variable_has_no_plugin_binding() {
        let dashboard = dashboard(&Settings::default()).unwrap();
        let datasource = &dashboard.variables()[0];
        assert_eq!(datasource.kind, VariableKind::Datasource);
        assert_eq!(datasource.query, None);
    }

    #[test]
    fn power_state_mappings_cover_both_states() {
        let dashboard = dashboard(&Settings::default()).unwrap();
        let power = dashboard
            .panels
            .iter()
            .find(|p| p.title == "Power State")
            .unwrap();
        let mappings = &power.field_config.as_ref().unwrap().defaults.mappings;
        assert_eq!(mappings[0].options["1"].text, "ON");
        assert_eq!(mappings[0].options["0"].text, "OFF");
    }
}
