#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub file_logs: bool,
    pub log_dir: String,
    pub daily_limit: usize,
    pub store_max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            file_logs: false,
            log_dir: "./logs".to_string(),
            daily_limit: 20,
            store_max_retries: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let log_format = lookup("LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or(defaults.log_format);

        let file_logs = lookup("REVIEW_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.file_logs);

        let log_dir = lookup("LOG_DIR").unwrap_or(defaults.log_dir);

        let daily_limit = lookup("DAILY_LIMIT")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.daily_limit);

        let store_max_retries = lookup("STORE_MAX_RETRIES")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(defaults.store_max_retries);

        Self {
            log_level,
            log_format,
            file_logs,
            log_dir,
            daily_limit,
            store_max_retries,
        }
    }
}
