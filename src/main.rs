use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quota_gateway::config::Args;
use quota_gateway::metrics::TRACKED_CLIENTS;
use quota_gateway::quota::{FixedWindowGuard, QuotaPolicy, SlidingLogGuard};
use quota_gateway::state::AppState;
use quota_gateway::upstream::UpstreamClient;

#[tokio::main]
async fn main() {
    // parse cli arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Shared state: one guard per guarded route, constructed here and
    // injected. The generate route uses the fixed window; summarize uses the
    // sliding log for smoother behavior on its short window.
    let state = Arc::new(AppState {
        upstream: UpstreamClient::new(
            &args.upstream_url,
            Duration::from_secs(args.upstream_timeout),
        ),
        generate_quota: Arc::new(FixedWindowGuard::new(args.generate_quota())),
        summarize_quota: Arc::new(SlidingLogGuard::new(args.summarize_quota())),
    });

    // Spawn the background sweep of expired quota records
    let sweep_state = Arc::clone(&state);
    let sweep_interval = Duration::from_secs(args.sweep_interval);
    tokio::spawn(async move {
        sweep_expired_records(sweep_state, sweep_interval).await;
    });

    let app = quota_gateway::build_router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");

    info!(port = args.port, upstream = %args.upstream_url, "gateway running");
    info!(
        max_uses = args.generate_max_uses,
        window_secs = args.generate_window,
        "generate quota"
    );
    info!(
        max_uses = args.summarize_max_uses,
        window_secs = args.summarize_window,
        "summarize quota"
    );
    axum::serve(listener, app).await.expect("server error");
}

// Sweep loop. Eviction only drops records whose window already elapsed, so
// it cannot change any quota decision — it just bounds table growth.
async fn sweep_expired_records(state: Arc<AppState>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        state.generate_quota.evict_expired();
        state.summarize_quota.evict_expired();

        let tracked =
            state.generate_quota.tracked_clients() + state.summarize_quota.tracked_clients();
        TRACKED_CLIENTS.set(tracked as f64);
    }
}
