use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "backoffice-core")]
#[command(about = "Admin back-office API: visibility toggles and login throttling")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Max login attempts per window
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub login_limit: u32,

    // Login window in seconds (15 minutes)
    #[arg(long, default_value_t = 900, value_parser = clap::value_parser!(u64).range(1..))]
    pub login_window: u64,

    // How often expired rate limit entries are swept, in seconds
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,

    // Frontend base url receiving revalidation calls
    // Example: "http://localhost:3000"
    #[arg(long, env = "REVALIDATE_URL")]
    pub revalidate_url: Option<String>,

    #[arg(long, env = "REVALIDATE_SECRET", default_value = "", hide_env_values = true)]
    pub revalidate_secret: String,

    // Pending invalidation jobs before new ones are dropped
    #[arg(long, default_value_t = 100)]
    pub invalidation_queue: usize,

    // JSON array of records loaded into the store at startup
    #[arg(long)]
    pub seed: Option<PathBuf>,

    // Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_login_policy() {
        let args = Args::parse_from(["backoffice-core"]);
        assert_eq!(args.login_limit, 5);
        assert_eq!(args.login_window(), Duration::from_secs(15 * 60));
        assert_eq!(args.sweep_interval(), Duration::from_secs(10 * 60));
        assert!(args.seed.is_none());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let parsed = Args::try_parse_from(["backoffice-core", "--login-limit", "0"]);
        assert!(parsed.is_err());
    }
}
