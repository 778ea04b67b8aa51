pub const DEFAULT_API_HOST: &str = "https://127.0.0.1:27124";

/// Connection settings for the vault's REST API.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_host: String,
    /// Accept self-signed certificates. Off unless explicitly requested.
    pub insecure_tls: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, api_host: impl Into<String>) -> Self {
        let api_host = api_host.into();
        Self {
            api_key: api_key.into(),
            api_host: api_host.trim_end_matches('/').to_string(),
            insecure_tls: false,
        }
    }

    pub fn with_insecure_tls(mut self, insecure_tls: bool) -> Self {
        self.insecure_tls = insecure_tls;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", DEFAULT_API_HOST)
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}
