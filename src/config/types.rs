use serde::Deserialize;

/// User agent sent with every request unless the config overrides it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Archive location used when neither the config nor `BUCKET_NAME` sets one
pub const DEFAULT_STORE_LOCATION: &str = "./knowledge-base";

/// Index page of the knowledge base
pub const DEFAULT_INDEX_URL: &str = "https://atendimento.tron.com.br/kb/article/140004/bem-vindo";

/// Main configuration structure for kb-archiver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Global cap on records considered per run; zero or negative is unlimited
    #[serde(rename = "max-downloads", default = "default_max_downloads")]
    pub max_downloads: i64,

    /// Number of fetch tasks dispatched together before waiting
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per record before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_downloads: default_max_downloads(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_downloads() -> i64 {
    10
}

fn default_batch_size() -> usize {
    50
}

fn default_max_attempts() -> u32 {
    5
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Literal `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Catalog listing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Page listing every article of the knowledge base
    #[serde(rename = "index-url", default = "default_index_url")]
    pub index_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
        }
    }
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Which backend holds the archive
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory (filesystem) or database file (sqlite)
    #[serde(default = "default_store_location")]
    pub location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            location: default_store_location(),
        }
    }
}

fn default_store_location() -> String {
    DEFAULT_STORE_LOCATION.to_string()
}

/// Available content store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Filesystem,
    Sqlite,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the markdown run report, if anywhere
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,
}
