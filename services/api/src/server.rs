use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_expense_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use expense_desk::config::AppConfig;
use expense_desk::error::AppError;
use expense_desk::expenses::evaluation::RuleEvaluator;
use expense_desk::expenses::router::ExpenseApi;
use expense_desk::expenses::store::ExpenseStore;
use expense_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = if args.empty {
        ExpenseStore::new()
    } else {
        ExpenseStore::seeded()
    };
    let api = ExpenseApi::new(store, RuleEvaluator::default());

    let app = with_expense_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, seeded = !args.empty, "expense desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
