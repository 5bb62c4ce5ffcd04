use clap::Parser;
use std::time::Duration;

use crate::quota::QuotaConfig;

// CLI argument structure. Quotas are deploy-time constants: there is no API
// to change them at runtime.
#[derive(Parser, Debug, Clone)]
#[command(name = "quota-gateway")]
#[command(about = "Usage-capped proxy for metered generative AI APIs")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Base URL of the upstream provider
    #[arg(short, long, default_value = "http://localhost:8000")]
    pub upstream_url: String,

    // Timeout for a single upstream call, in seconds
    #[arg(long, default_value_t = 60)]
    pub upstream_timeout: u64,

    // Generate route: uses allowed per window
    #[arg(long, default_value_t = 3)]
    pub generate_max_uses: u32,

    // Generate route: window in seconds (default 24h)
    #[arg(long, default_value_t = 86_400)]
    pub generate_window: u64,

    // Summarize route: uses allowed per window
    #[arg(long, default_value_t = 5)]
    pub summarize_max_uses: u32,

    // Summarize route: window in seconds (default 15min)
    #[arg(long, default_value_t = 900)]
    pub summarize_window: u64,

    // How often to sweep expired quota records, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,
}

impl Args {
    pub fn generate_quota(&self) -> QuotaConfig {
        QuotaConfig::new(
            self.generate_max_uses,
            Duration::from_secs(self.generate_window),
        )
    }

    pub fn summarize_quota(&self) -> QuotaConfig {
        QuotaConfig::new(
            self.summarize_max_uses,
            Duration::from_secs(self.summarize_window),
        )
    }
}
