pub mod backend;
pub mod book;
pub mod domain;
pub mod ev;
pub mod refresh;
pub mod sequence;
pub mod session;
pub mod time;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod testing;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_RISK_FREE_RATE_PCT: f64 = 5.0;
    pub const DEFAULT_SUGGESTIONS_REFRESH_SECS: u64 = 300;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub http_timeout_secs: u64,
        pub risk_free_rate_pct: f64,
        pub suggestions_refresh_secs: u64,
        pub uid: Option<String>,
        pub user_name: Option<String>,
        pub user_email: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                risk_free_rate_pct: DEFAULT_RISK_FREE_RATE_PCT,
                suggestions_refresh_secs: DEFAULT_SUGGESTIONS_REFRESH_SECS,
                uid: None,
                user_name: None,
                user_email: None,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                api_base_url: non_empty_var("OPTISCOPE_API_BASE_URL")
                    .unwrap_or(defaults.api_base_url),
                http_timeout_secs: parsed_var("OPTISCOPE_HTTP_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http_timeout_secs),
                risk_free_rate_pct: parsed_var("OPTISCOPE_RISK_FREE_RATE_PCT")?
                    .unwrap_or(defaults.risk_free_rate_pct),
                suggestions_refresh_secs: parsed_var("OPTISCOPE_SUGGESTIONS_REFRESH_SECS")?
                    .unwrap_or(defaults.suggestions_refresh_secs),
                uid: non_empty_var("OPTISCOPE_UID"),
                user_name: non_empty_var("OPTISCOPE_USER_NAME"),
                user_email: non_empty_var("OPTISCOPE_USER_EMAIL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_user_email(&self) -> anyhow::Result<&str> {
            self.user_email
                .as_deref()
                .context("OPTISCOPE_USER_EMAIL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| {
                s.parse::<T>()
                    .with_context(|| format!("{key} has an invalid value: {s}"))
            })
            .transpose()
    }
}
