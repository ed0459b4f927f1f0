pub mod domain;
pub mod llm;
pub mod market;
pub mod news;
pub mod pipeline;

pub mod config {
    use anyhow::bail;
    use std::fmt;
    use std::str::FromStr;

    const DEFAULT_PORT: u16 = 3000;

    const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
    const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
    const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_DISCOVERY_MAX_TOKENS: u32 = 1000;
    const DEFAULT_ANALYSIS_MAX_TOKENS: u32 = 500;

    const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org";
    const DEFAULT_NEWSAPI_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_NEWS_MAX_ARTICLES: usize = 3;
    // NewsAPI rejects pageSize above 100.
    const MAX_NEWS_ARTICLES: usize = 100;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum LlmProviderKind {
        #[default]
        OpenAi,
        Anthropic,
    }

    impl FromStr for LlmProviderKind {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "openai" => Ok(Self::OpenAi),
                "anthropic" => Ok(Self::Anthropic),
                other => bail!("unknown LLM_PROVIDER {other:?} (expected openai or anthropic)"),
            }
        }
    }

    /// What the pipeline does when the price or news fetch fails after a symbol was picked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum PartialDataPolicy {
        /// Run the analysis with whatever data exists.
        #[default]
        Proceed,
        /// Abort the run and render the error page.
        FailFast,
    }

    impl FromStr for PartialDataPolicy {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "proceed" => Ok(Self::Proceed),
                "fail" | "fail_fast" | "fail-fast" => Ok(Self::FailFast),
                other => bail!("unknown SOTD_PARTIAL_DATA {other:?} (expected proceed or fail)"),
            }
        }
    }

    #[derive(Clone)]
    pub struct Settings {
        pub news_api_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub llm_provider: LlmProviderKind,

        pub openai_base_url: String,
        pub openai_model: String,
        pub openai_timeout_secs: u64,
        pub discovery_max_tokens: u32,
        pub analysis_max_tokens: u32,

        pub anthropic_base_url: String,
        pub anthropic_model: String,
        pub anthropic_timeout_secs: u64,

        pub news_api_base_url: String,
        pub news_api_timeout_secs: u64,
        pub news_max_articles: usize,

        pub partial_data: PartialDataPolicy,
        pub sentry_dsn: Option<String>,
        pub port: u16,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
            let string_or = |key: &str, default: &str| {
                non_empty(key).unwrap_or_else(|| default.to_string())
            };

            let llm_provider = match non_empty("LLM_PROVIDER") {
                Some(s) => s.parse()?,
                None => LlmProviderKind::default(),
            };
            let partial_data = match non_empty("SOTD_PARTIAL_DATA") {
                Some(s) => s.parse()?,
                None => PartialDataPolicy::default(),
            };

            let news_max_articles = parse_or(
                non_empty("NEWS_MAX_ARTICLES"),
                DEFAULT_NEWS_MAX_ARTICLES,
            )
            .clamp(1, MAX_NEWS_ARTICLES);

            Ok(Self {
                news_api_key: non_empty("NEWSAPI_KEY"),
                openai_api_key: non_empty("OPENAI_API_KEY"),
                anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
                llm_provider,

                openai_base_url: string_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                openai_model: string_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                openai_timeout_secs: parse_or(
                    non_empty("OPENAI_TIMEOUT_SECS"),
                    DEFAULT_LLM_TIMEOUT_SECS,
                ),
                discovery_max_tokens: parse_or(
                    non_empty("OPENAI_DISCOVERY_MAX_TOKENS"),
                    DEFAULT_DISCOVERY_MAX_TOKENS,
                ),
                analysis_max_tokens: parse_or(
                    non_empty("OPENAI_ANALYSIS_MAX_TOKENS"),
                    DEFAULT_ANALYSIS_MAX_TOKENS,
                ),

                anthropic_base_url: string_or("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
                anthropic_model: string_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                anthropic_timeout_secs: parse_or(
                    non_empty("ANTHROPIC_TIMEOUT_SECS"),
                    DEFAULT_LLM_TIMEOUT_SECS,
                ),

                news_api_base_url: string_or("NEWSAPI_BASE_URL", DEFAULT_NEWSAPI_BASE_URL),
                news_api_timeout_secs: parse_or(
                    non_empty("NEWSAPI_TIMEOUT_SECS"),
                    DEFAULT_NEWSAPI_TIMEOUT_SECS,
                ),
                news_max_articles,

                partial_data,
                sentry_dsn: non_empty("SENTRY_DSN"),
                port: parse_or(non_empty("PORT"), DEFAULT_PORT),
            })
        }

        /// Names of the secrets the configured providers need but that are unset.
        pub fn missing_secrets(&self) -> Vec<&'static str> {
            let mut out = Vec::new();
            match self.llm_provider {
                LlmProviderKind::OpenAi if self.openai_api_key.is_none() => {
                    out.push("OPENAI_API_KEY")
                }
                LlmProviderKind::Anthropic if self.anthropic_api_key.is_none() => {
                    out.push("ANTHROPIC_API_KEY")
                }
                _ => {}
            }
            if self.news_api_key.is_none() {
                out.push("NEWSAPI_KEY");
            }
            out
        }
    }

    fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
        value
            .and_then(|s| s.trim().parse::<T>().ok())
            .unwrap_or(default)
    }

    fn redacted(secret: &Option<String>) -> &'static str {
        match secret {
            Some(_) => "<redacted>",
            None => "<unset>",
        }
    }

    impl fmt::Debug for Settings {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Settings")
                .field("news_api_key", &redacted(&self.news_api_key))
                .field("openai_api_key", &redacted(&self.openai_api_key))
                .field("anthropic_api_key", &redacted(&self.anthropic_api_key))
                .field("llm_provider", &self.llm_provider)
                .field("openai_base_url", &self.openai_base_url)
                .field("openai_model", &self.openai_model)
                .field("openai_timeout_secs", &self.openai_timeout_secs)
                .field("discovery_max_tokens", &self.discovery_max_tokens)
                .field("analysis_max_tokens", &self.analysis_max_tokens)
                .field("anthropic_base_url", &self.anthropic_base_url)
                .field("anthropic_model", &self.anthropic_model)
                .field("anthropic_timeout_secs", &self.anthropic_timeout_secs)
                .field("news_api_base_url", &self.news_api_base_url)
                .field("news_api_timeout_secs", &self.news_api_timeout_secs)
                .field("news_max_articles", &self.news_max_articles)
                .field("partial_data", &self.partial_data)
                .field("sentry_dsn", &redacted(&self.sentry_dsn))
                .field("port", &self.port)
                .finish()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| map.get(key).cloned())
        }

        #[test]
        fn defaults_apply_when_nothing_is_set() {
            let s = settings_from(&[]).unwrap();
            assert_eq!(s.llm_provider, LlmProviderKind::OpenAi);
            assert_eq!(s.openai_model, "gpt-4o-mini");
            assert_eq!(s.discovery_max_tokens, 1000);
            assert_eq!(s.analysis_max_tokens, 500);
            assert_eq!(s.news_max_articles, 3);
            assert_eq!(s.news_api_timeout_secs, 10);
            assert_eq!(s.partial_data, PartialDataPolicy::Proceed);
            assert_eq!(s.port, 3000);
            assert!(s.openai_api_key.is_none());
            assert_eq!(s.missing_secrets(), vec!["OPENAI_API_KEY", "NEWSAPI_KEY"]);
        }

        #[test]
        fn blank_secrets_are_treated_as_unset() {
            let s = settings_from(&[("OPENAI_API_KEY", "  "), ("NEWSAPI_KEY", "news-key")]).unwrap();
            assert!(s.openai_api_key.is_none());
            assert_eq!(s.news_api_key.as_deref(), Some("news-key"));
        }

        #[test]
        fn unparseable_numbers_fall_back_to_defaults() {
            let s = settings_from(&[("PORT", "not-a-port"), ("NEWS_MAX_ARTICLES", "0")]).unwrap();
            assert_eq!(s.port, 3000);
            assert_eq!(s.news_max_articles, 1);
        }

        #[test]
        fn rejects_unknown_provider_and_policy() {
            assert!(settings_from(&[("LLM_PROVIDER", "cohere")]).is_err());
            assert!(settings_from(&[("SOTD_PARTIAL_DATA", "maybe")]).is_err());
        }

        #[test]
        fn anthropic_provider_requires_its_own_key() {
            let s = settings_from(&[
                ("LLM_PROVIDER", "Anthropic"),
                ("SOTD_PARTIAL_DATA", "fail"),
                ("NEWSAPI_KEY", "n"),
            ])
            .unwrap();
            assert_eq!(s.llm_provider, LlmProviderKind::Anthropic);
            assert_eq!(s.partial_data, PartialDataPolicy::FailFast);
            assert_eq!(s.missing_secrets(), vec!["ANTHROPIC_API_KEY"]);
        }

        #[test]
        fn debug_output_redacts_secrets() {
            let s = settings_from(&[
                ("OPENAI_API_KEY", "sk-very-secret"),
                ("NEWSAPI_KEY", "news-very-secret"),
            ])
            .unwrap();
            let debug = format!("{s:?}");
            assert!(!debug.contains("sk-very-secret"));
            assert!(!debug.contains("news-very-secret"));
            assert!(debug.contains("<redacted>"));
        }
    }
}
