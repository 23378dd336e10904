use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
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
    /// JSON file backing the persisted key-value record.
    pub store_path: PathBuf,
    pub collector_url: String,
    /// Static `source` tag sent alongside every delivered batch.
    pub source_tag: String,
    pub user_agent: String,
    pub dispatch_interval_secs: u64,
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub extract_timeout_secs: u64,
    /// `None` keeps the queue unbounded.
    pub max_queue_len: Option<usize>,
}

impl AppConfig {
    #[must_use]
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_secs(self.dispatch_interval_secs)
    }

    #[must_use]
    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }
}
