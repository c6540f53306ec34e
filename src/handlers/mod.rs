mod health;
mod login;
mod metrics;
mod toggle;

pub use health::{health_handler, keep_alive_handler};
pub use login::{client_ip, login_check_handler};
pub use metrics::metrics_handler;
pub use toggle::toggle_handler;
