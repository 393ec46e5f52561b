use tracing::Level;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    /// JWT of the signed-in user, if any.
    pub session_token: Option<String>,
    /// Whether that user signed in through Google.
    pub provider_login: bool,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            session_token: None,
            provider_login: false,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Reads `RECIPES_*` variables at runtime, falling back to the values baked in at build
    /// time (the only source on the web target).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| match key {
                "RECIPES_API_URL" => option_env!("RECIPES_API_URL").map(str::to_string),
                "RECIPES_SESSION_TOKEN" => option_env!("RECIPES_SESSION_TOKEN").map(str::to_string),
                "RECIPES_PROVIDER_LOGIN" => option_env!("RECIPES_PROVIDER_LOGIN").map(str::to_string),
                "RECIPES_LOG" => option_env!("RECIPES_LOG").map(str::to_string),
                _ => None,
            })
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_level = match non_empty("RECIPES_LOG") {
            Some(raw) => raw.parse::<Level>().unwrap_or_else(|_| {
                eprintln!("Unknown log level {:?}, using {}", raw, defaults.log_level);
                defaults.log_level
            }),
            None => defaults.log_level,
        };

        Self {
            api_base_url: non_empty("RECIPES_API_URL").unwrap_or(defaults.api_base_url),
            session_token: non_empty("RECIPES_SESSION_TOKEN"),
            provider_login: non_empty("RECIPES_PROVIDER_LOGIN")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.provider_login),
            log_level,
        }
    }
}
