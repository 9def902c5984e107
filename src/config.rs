use crate::ResponseFormat;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ENDPOINT: &str = "/classify";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint: String,
    pub format: ResponseFormat,
    /// Show `Loading...` while a request is in flight. When off the display is
    /// hidden instead, so a stale label never lingers.
    pub show_loading: bool,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            format: ResponseFormat::default(),
            show_loading: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Joins `base_url` with a request target such as `/classify?time=1`.
    pub fn url_for(&self, target: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }
}

pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_classifier() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.endpoint, "/classify");
        assert_eq!(config.format, ResponseFormat::Json);
        assert!(config.show_loading);
    }

    #[test]
    fn url_for_avoids_double_slashes() {
        let config = ClientConfig {
            base_url: "http://example.test/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.url_for("/classify?time=5"),
            "http://example.test/classify?time=5"
        );
    }
}
