use std::sync::Arc;

use rally_app::app::api::routes;
use rally_app::calendar_handler::CalendarServiceHandler;
use rally_app::config::{ConfigHandler, load_config};
use rally_service::calendar::CalendarService;
use rally_service::store::{EventStore, MemoryEventStore};
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(filter_layer).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true),
    );
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    tracing::info!("Starting Rally calendar server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = match &config.calendar.seed_file {
        Some(path) => MemoryEventStore::load_json_file(path).await?,
        None => MemoryEventStore::new(),
    };
    let store: Arc<dyn EventStore> = Arc::new(store);
    let calendar = CalendarService::from_config(store, &config.calendar);

    tracing::info!(
        month_end = ?calendar.expander().options().month_end,
        max_occurrences = config.calendar.max_occurrences,
        "Calendar service ready"
    );

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(CalendarServiceHandler {
            service: Arc::new(calendar),
        })
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .push(routes());

    tracing::info!(origin = %config.server.origin(), "Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
