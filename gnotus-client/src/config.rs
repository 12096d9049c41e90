//! Configuration for the Gnotus client

use serde::{Deserialize, Serialize};

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Reduced-motion preference; fragment scrolls jump instead of animate
    #[serde(default)]
    pub reduced_motion: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            reduced_motion: false,
        }
    }
}

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Gnotus server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout() -> u64 {
    30000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: 30000,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTL in seconds; entries older than this are never served
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

fn default_true() -> bool {
    true
}
fn default_ttl() -> u64 {
    // 24 hours, matching the persisted-entry contract
    86_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_ttl(),
        }
    }
}

impl CacheConfig {
    /// TTL in epoch-millisecond units, the granularity cache entries use
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_seconds as i64 * 1000
    }
}
