/// Path of the command socket relative to the base URL
pub const WS_PATH: &str = "/ws";

/// Backend endpoint configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Create a new ApiConfig from the API_BASE_URL environment variable
    pub fn new() -> Result<Self, &'static str> {
        if let Some(url) = option_env!("API_BASE_URL") {
            Ok(Self::from_url(url))
        } else {
            Err("API_BASE_URL environment variable is not set")
        }
    }

    /// Create a new ApiConfig from a URL string
    pub fn from_url(url: &str) -> Self {
        Self { base_url: url.trim_end_matches('/').to_string() }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the WebSocket URL
    pub fn ws_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}{}", ws_base, WS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let cfg = ApiConfig::from_url("http://example.org/admin/");
        assert_eq!(cfg.base_url(), "http://example.org/admin");
        assert_eq!(cfg.ws_url(), "ws://example.org/admin/ws");
    }

    #[test]
    fn https_maps_to_wss() {
        assert_eq!(ApiConfig::from_url("https://example.org").ws_url(), "wss://example.org/ws");
    }

    #[test]
    fn ws_scheme_is_kept() {
        assert_eq!(ApiConfig::from_url("ws://10.0.0.1:8080").ws_url(), "ws://10.0.0.1:8080/ws");
    }

    #[test]
    fn bare_host_keeps_its_port() {
        assert_eq!(ApiConfig::from_url("http://localhost:8082").ws_url(), "ws://localhost:8082/ws");
    }
}
