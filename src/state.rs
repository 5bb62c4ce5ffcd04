use std::sync::Arc;

use crate::quota::QuotaPolicy;
use crate::upstream::UpstreamClient;

// App's shared state. Each guarded route owns its guard instance, built in
// main (or a test) and injected here — no module-level quota table, so tests
// get fresh, isolated state.
pub struct AppState {
    pub upstream: UpstreamClient,
    pub generate_quota: Arc<dyn QuotaPolicy>,
    pub summarize_quota: Arc<dyn QuotaPolicy>,
}
