use std::sync::Arc;

use actix_web::{App, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use booksummary_api::app_config::{config_app, json_config, query_config};
use booksummary_api::cover_resolver::GoogleBooksCoverResolver;
use booksummary_api::generative_model::{GeminiGenerativeModel, GeminiGenerativeModelConfig};
use booksummary_api::settings::Settings;
use booksummary_api::summary_service::BookSummaryService;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "booksummary_api";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let settings = Settings::from_env().expect("Failed to load settings");
    if settings.google_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set, search and summarize will fail");
    }

    let model = GeminiGenerativeModel::new(GeminiGenerativeModelConfig {
        base_url: settings.gemini_url.clone(),
        model: settings.model.clone(),
        api_key: settings.google_api_key.clone(),
    })
    .expect("Failed to create generative model client");
    let cover_resolver =
        GoogleBooksCoverResolver::new(&settings.covers_url).expect("Failed to create cover resolver");
    let service = web::Data::new(BookSummaryService::new(
        Arc::new(model),
        Arc::new(cover_resolver),
    ));

    tracing::info!(
        "starting HTTP server at http://{}:{} using model {}",
        settings.host,
        settings.port,
        settings.model
    );

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(service.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
