use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    #[error("Exporter build error, {0}")]
    ExporterBuildError(#[from] opentelemetry_otlp::ExporterBuildError),
    #[error("Subscriber init error, {0}")]
    SubscriberInitError(#[from] tracing_subscriber::util::TryInitError),
}
