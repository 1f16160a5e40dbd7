//! Public URL composition for callbacks registered with third parties

/// Path Telegram posts updates to
pub const TELEGRAM_WEBHOOK_PATH: &str = "/webhook/telegram";

/// Externally reachable base URL of this service
#[derive(Debug, Clone, PartialEq)]
pub struct PublicUrl {
    base: String,
}

impl PublicUrl {
    /// Create a new public URL, dropping any trailing slash
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Append a path to the base URL
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// URL Telegram should deliver updates to
    pub fn telegram_webhook(&self) -> String {
        self.join(TELEGRAM_WEBHOOK_PATH)
    }
}
