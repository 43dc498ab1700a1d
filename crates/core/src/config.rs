use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub links: LinksConfig,
    pub cache: CacheConfig,
    pub pool: PoolConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_lower")]
    pub retry_lower_seconds: u64,
    #[serde(default = "default_retry_upper")]
    pub retry_upper_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_lower_seconds: default_retry_lower(),
            retry_upper_seconds: default_retry_upper(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LinksConfig {
    #[serde(default = "default_page_host")]
    pub page_host: String,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default)]
    pub https: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            page_host: default_page_host(),
            api_host: default_api_host(),
            https: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default)]
    pub offline: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
            offline: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverConfig {
    #[serde(default = "default_public_db")]
    pub public_db: String,
    #[serde(default = "default_secure_db")]
    pub secure_db: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            public_db: default_public_db(),
            secure_db: default_secure_db(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            links: LinksConfig::default(),
            cache: CacheConfig::default(),
            pool: PoolConfig::default(),
            solver: SolverConfig::default(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_lower() -> u64 {
    5
}
fn default_retry_upper() -> u64 {
    15
}
fn default_page_host() -> String {
    "boards.4chan.org".to_string()
}
fn default_api_host() -> String {
    "a.4cdn.org".to_string()
}
fn default_cache_file() -> String {
    "bin/cache.bin".to_string()
}
fn default_num_threads() -> usize {
    32
}
fn default_public_db() -> String {
    "tripcodes/public.db3".to_string()
}
fn default_secure_db() -> String {
    "tripcodes/secure.db3".to_string()
}
