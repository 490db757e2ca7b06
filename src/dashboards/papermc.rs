//! PaperMC server monitoring: game health at the top, runtime and container
//! detail below, pod logs at the bottom.

use crate::config::Settings;
use crate::dashboard::{
    Dashboard, PanelBuilder, PanelKind, Query, QueryBuilder, RefreshPolicy, SourceKind,
    VariableBuilder, VariableKind,
};
use crate::error::Result;

fn metric(expr: &str, legend: &str) -> Result<Query> {
    QueryBuilder::new().expr(expr).legend_format(legend).build()
}

pub fn dashboard(settings: &Settings) -> Result<Dashboard> {
    let metrics = settings.datasources.metrics.as_str();
    let logs = settings.datasources.logs.as_str();

    let mut builder = Dashboard::builder("PaperMC Server Monitoring");
    builder
        .description("Minecraft server metrics and logs")?
        .tags(["minecraft", "papermc", "kubernetes"])?
        .timezone(settings.timezone())?
        .refresh(settings.refresh_or("30s"))?;
    for tag in &settings.tags {
        builder.tag(tag.as_str())?;
    }

    builder
        .variable(
            VariableBuilder::new("datasource")
                .kind(VariableKind::Datasource)
                .label("Prometheus")
                .plugin_type("prometheus")
                .build()?,
        )?
        .variable(
            VariableBuilder::new("loki")
                .kind(VariableKind::Datasource)
                .label("Loki")
                .plugin_type("loki")
                .build()?,
        )?
        .variable(
            VariableBuilder::new("pod")
                .label("Pod")
                .datasource(metrics)
                .query(QueryBuilder::new().expr("label_values(mc_tps, pod)").build()?)
                .refresh(RefreshPolicy::OnDashboardLoad)
                .build()?,
        )?;

    // Row 1: game status
    builder
        .panel(
            PanelBuilder::new()
                .title("TPS")
                .description("Ticks per second (target: 20)")
                .kind(PanelKind::Gauge)
                .datasource(metrics)
                .target(metric("mc_tps{pod=~\"$pod\"}", "TPS")?)
                .bounds(0.0, 20.0)
                .grid_pos(5, 4, 0, 0)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Players Online")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric("sum(mc_players_online_total{pod=~\"$pod\"})", "Online")?)
                .grid_pos(5, 4, 4, 0)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Total Players")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric("mc_players_total{pod=~\"$pod\"}", "Total")?)
                .grid_pos(5, 4, 8, 0)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Loaded Chunks")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric("sum(mc_loaded_chunks_total{pod=~\"$pod\"})", "Chunks")?)
                .grid_pos(5, 4, 12, 0)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Status")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric(
                    "count(container_last_seen{pod=~\"$pod\", container=\"papermc\"} > (time() - 60))",
                    "Status",
                )?)
                .value_mapping("1", "UP", "green")
                .value_mapping("0", "DOWN", "red")
                .grid_pos(5, 4, 16, 0)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Uptime")
                .kind(PanelKind::Stat)
                .datasource(metrics)
                .target(metric(
                    "time() - container_start_time_seconds{pod=~\"$pod\", container=\"papermc\"}",
                    "Uptime",
                )?)
                .unit("s")
                .grid_pos(5, 4, 20, 0)
                .build()?,
        )?;

    // Row 2: tick health over time
    builder
        .panel(
            PanelBuilder::new()
                .title("TPS Over Time")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric("mc_tps{pod=~\"$pod\"}", "TPS")?)
                .bounds(0.0, 20.0)
                .grid_pos(8, 12, 0, 5)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Tick Duration")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "mc_tick_duration_average{pod=~\"$pod\"} / 1000000",
                    "Average",
                )?)
                .target(metric(
                    "mc_tick_duration_median{pod=~\"$pod\"} / 1000000",
                    "Median",
                )?)
                .target(metric("mc_tick_duration_max{pod=~\"$pod\"} / 1000000", "Max")?)
                .unit("ms")
                .grid_pos(8, 12, 12, 5)
                .build()?,
        )?;

    // Row 3: world stats
    builder
        .panel(
            PanelBuilder::new()
                .title("World Size")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric("mc_world_size{pod=~\"$pod\"}", "{{world}}")?)
                .unit("bytes")
                .grid_pos(8, 12, 0, 13)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Players per World")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric("mc_players_online_total{pod=~\"$pod\"}", "{{world}}")?)
                .grid_pos(8, 12, 12, 13)
                .build()?,
        )?;

    // Row 4: JVM
    builder
        .panel(
            PanelBuilder::new()
                .title("JVM Memory")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "mc_jvm_memory{pod=~\"$pod\", type=\"allocated\"}",
                    "Allocated",
                )?)
                .target(metric("mc_jvm_memory{pod=~\"$pod\", type=\"max\"}", "Max")?)
                .target(metric("mc_jvm_memory{pod=~\"$pod\", type=\"free\"}", "Free")?)
                .unit("bytes")
                .grid_pos(8, 12, 0, 21)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("JVM GC")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "rate(mc_jvm_gc_collection_seconds_sum{pod=~\"$pod\"}[5m])",
                    "{{gc}}",
                )?)
                .unit("s")
                .grid_pos(8, 12, 12, 21)
                .build()?,
        )?;

    // Row 5: container resources
    builder
        .panel(
            PanelBuilder::new()
                .title("Container CPU")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "sum(rate(container_cpu_usage_seconds_total{pod=~\"$pod\", container=\"papermc\"}[5m]))",
                    "CPU Usage",
                )?)
                .target(metric(
                    "sum(container_spec_cpu_quota{pod=~\"$pod\", container=\"papermc\"} / container_spec_cpu_period{pod=~\"$pod\", container=\"papermc\"})",
                    "Limit",
                )?)
                .unit("short")
                .grid_pos(8, 12, 0, 29)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Container Memory")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "container_memory_working_set_bytes{pod=~\"$pod\", container=\"papermc\"}",
                    "Working Set",
                )?)
                .target(metric(
                    "container_spec_memory_limit_bytes{pod=~\"$pod\", container=\"papermc\"}",
                    "Limit",
                )?)
                .unit("bytes")
                .grid_pos(8, 12, 12, 29)
                .build()?,
        )?;

    // Row 6: network and disk
    builder
        .panel(
            PanelBuilder::new()
                .title("Network Traffic")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "sum(rate(container_network_receive_bytes_total{pod=~\"$pod\"}[5m]))",
                    "Receive",
                )?)
                .target(metric(
                    "sum(rate(container_network_transmit_bytes_total{pod=~\"$pod\"}[5m]))",
                    "Transmit",
                )?)
                .unit("Bps")
                .grid_pos(8, 12, 0, 37)
                .build()?,
        )?
        .panel(
            PanelBuilder::new()
                .title("Disk I/O")
                .kind(PanelKind::TimeSeries)
                .datasource(metrics)
                .target(metric(
                    "sum(rate(container_fs_reads_bytes_total{pod=~\"$pod\", container=\"papermc\"}[5m]))",
                    "Read",
                )?)
                .target(metric(
                    "sum(rate(container_fs_writes_bytes_total{pod=~\"$pod\", container=\"papermc\"}[5m]))",
                    "Write",
                )?)
                .unit("Bps")
                .grid_pos(8, 12, 12, 37)
                .build()?,
        )?;

    // Row 7: logs
    builder.panel(
        PanelBuilder::new()
            .title("Server Logs")
            .kind(PanelKind::LogView)
            .datasource(logs)
            .target(
                QueryBuilder::new()
                    .expr("{kubernetes_namespace_name=\"paper\", kubernetes_pod_name=~\"$pod\"}")
                    .source(SourceKind::Log)
                    .build()?,
            )
            .show_time(true)
            .wrap_log_message(true)
            .grid_pos(12, 24, 0, 45)
            .build()?,
    )?;

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::serialize;

    #[test]
    fn builds_with_default_settings() {
        let dashboard = dashboard(&Settings::default()).unwrap();
        assert_eq!(dashboard.title, "PaperMC Server Monitoring");
        assert_eq!(dashboard.refresh, "30s");
        assert_eq!(dashboard.variables().len(), 3);
        assert_eq!(dashboard.panels.len(), 17);

        let last = dashboard.panels.last().unwrap();
        assert_eq!(last.kind, PanelKind::LogView);
        assert_eq!(last.datasource.uid, "${loki}");
    }

    #[test]
    fn settings_overrides_flow_through() {
        let settings: Settings = toml::from_str(
            r#"
            refresh = "10s"
            tags = ["staging"]

            [datasources]
            metrics = "prom-main"
            logs = "loki-main"
            "#,
        )
        .unwrap();
        let dashboard = dashboard(&settings).unwrap();
        assert_eq!(dashboard.refresh, "10s");
        assert!(dashboard.tags.contains(&"staging".to_string()));
        assert_eq!(dashboard.panels[0].datasource.uid, "prom-main");
        assert_eq!(dashboard.panels.last().unwrap().datasource.uid, "loki-main");
    }

    #[test]
    fn document_encodes_cleanly() {
        let dashboard = dashboard(&Settings::default()).unwrap();
        let bytes = serialize::to_bytes(&dashboard).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["panels"][0]["type"], "gauge");
        assert_eq!(doc["panels"][0]["fieldConfig"]["defaults"]["max"], 20.0);
        assert_eq!(doc["templating"]["variables"][2]["refresh"], 1);
    }
}
