/// Credential value that forces demo mode even when set.
pub const DEMO_MODE_KEY: &str = "demo-mode";

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the text-generation endpoint.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None`, empty or [`DEMO_MODE_KEY`] selects demo mode.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Default                       |
    /// |---------------------|-------------------------------|
    /// | `ANTHROPIC_API_KEY` | unset (demo mode)             |
    /// | `AI_MODEL`          | `claude-3-5-sonnet-20241022`  |
    /// | `AI_MAX_TOKENS`     | `2000`                        |
    /// | `AI_BASE_URL`       | `https://api.anthropic.com`   |
    /// | `AI_TIMEOUT_SECS`   | `60`                          |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable is set but does not parse.
    pub fn from_env() -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let max_tokens: u32 = std::env::var("AI_MAX_TOKENS")
            .unwrap_or_else(|_| DEFAULT_MAX_TOKENS.to_string())
            .parse()
            .expect("AI_MAX_TOKENS must be a valid u32");

        let base_url = std::env::var("AI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = std::env::var("AI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("AI_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            model,
            max_tokens,
            base_url,
            timeout_secs,
        }
    }

    /// Configuration that always answers from demo payloads.
    pub fn demo() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The usable credential, if any.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != DEMO_MODE_KEY)
    }

    pub fn is_demo(&self) -> bool {
        self.credential().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key(key: Option<&str>) -> AiConfig {
        AiConfig {
            api_key: key.map(String::from),
            ..AiConfig::demo()
        }
    }

    #[test]
    fn missing_empty_or_sentinel_key_means_demo() {
        assert!(with_key(None).is_demo());
        assert!(with_key(Some("")).is_demo());
        assert!(with_key(Some("  ")).is_demo());
        assert!(with_key(Some(DEMO_MODE_KEY)).is_demo());
    }

    #[test]
    fn real_key_disables_demo() {
        let config = with_key(Some("sk-ant-test"));
        assert!(!config.is_demo());
        assert_eq!(config.credential(), Some("sk-ant-test"));
    }
}
