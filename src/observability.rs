use opentelemetry_sdk::runtime::Tokio;
use opentelemetry_sdk::trace::{self, RandomIdGenerator, Sampler, Tracer};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::configuration::{ObservabilitySettings, TraceExporter};

/// Log output filtered by `settings.log_filter`, plus the span export when one is configured.
///
/// The exporters install batch processors on the tokio runtime, call this from within it.
pub fn get_subscriber(
    service_name: &str,
    settings: &ObservabilitySettings,
) -> anyhow::Result<impl Subscriber + Sync + Send> {
    let telemetry: Option<OpenTelemetryLayer<Registry, Tracer>> = settings
        .exporter
        .as_ref()
        .map(|exporter| install_tracer(service_name, exporter))
        .transpose()?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let env_filter = EnvFilter::try_new(&settings.log_filter)?;

    Ok(Registry::default()
        .with(telemetry)
        .with(env_filter)
        .with(tracing_subscriber::fmt::Layer::new()))
}

pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

fn install_tracer(service_name: &str, exporter: &TraceExporter) -> anyhow::Result<Tracer> {
    let tracer = match exporter {
        TraceExporter::Datadog { agent_endpoint } => opentelemetry_datadog::new_pipeline()
            .with_service_name(service_name)
            .with_agent_endpoint(agent_endpoint)
            .with_trace_config(
                trace::config()
                    .with_sampler(Sampler::AlwaysOn)
                    .with_id_generator(RandomIdGenerator::default()),
            )
            .install_batch(Tokio)?,
        TraceExporter::Jaeger => opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(service_name)
            .install_batch(Tokio)?,
    };

    Ok(tracer)
}
