use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

const DEFAULT_FILTER: &str = "juantap=info";

pub struct ObservabilityGuard {
    otlp: bool,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if self.otlp {
            shutdown();
        }
    }
}

pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    let otlp = init_tracing(config)?;
    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }
    Ok(ObservabilityGuard { otlp })
}

/// Install the global subscriber; returns whether OTLP export is active
fn init_tracing(config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    // stdout is reserved for command output
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    // Optional OTLP layer for distributed tracing
    if let Some(endpoint) = &config.otel_exporter_endpoint {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint);

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", config.service_name.clone()),
            ])))
            .install_batch(runtime::Tokio)?;

        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        Registry::default()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;

        tracing::info!("OTLP trace export enabled ({})", endpoint);
        return Ok(true);
    }

    Registry::default().with(env_filter).with(fmt_layer).try_init()?;
    Ok(false)
}

/// Without this, counters go to whatever recorder the host installed, or nowhere
fn init_metrics(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;

    tracing::info!("Metrics exporter (Prometheus) started on port {}", port);
    Ok(())
}

pub fn shutdown() {
    global::shutdown_tracer_provider();
}
