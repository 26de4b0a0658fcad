use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding `flyers.json` and `shopping_list.json`.
    pub data_dir: PathBuf,
    /// Explicit Chrome/Chromium executable; auto-discovered when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Upper bound for wait-for-selector page readiness checks.
    pub page_timeout_secs: u64,
    /// Lifetime of shared shopping-list links.
    pub share_link_ttl_secs: u64,
    /// External base URL used when building shareable list links.
    pub public_base_url: String,
}
