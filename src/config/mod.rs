use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use directories::BaseDirs;

pub const DEFAULT_EXECUTOR_URL: &str = "http://localhost:8080/";
pub const DEFAULT_CONSOLE_BASE_URL: &str = "https://gwc-experiment.appspot.com/";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_STACKEXCHANGE_API_BASE: &str = "https://api.stackexchange.com/2.3";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    read_env: bool,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .gconsolerc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, read_env: true, config_path }
    }

    /// Defaults overlaid with `values`, ignoring the rc file and the environment.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = default_map();
        for (k, v) in values {
            map.insert(k.into(), v.into());
        }
        Self { inner: map, read_env: false, config_path: default_config_path() }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if self.read_env {
            if let Ok(v) = env::var(key) {
                return Some(v);
            }
        }
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("REQUEST_TIMEOUT").unwrap_or(60))
    }

    pub fn executor_url(&self) -> String {
        self.get("EXECUTOR_URL").unwrap_or_else(|| DEFAULT_EXECUTOR_URL.to_string())
    }

    pub fn console_base_url(&self) -> String {
        self.get("CONSOLE_BASE_URL").unwrap_or_else(|| DEFAULT_CONSOLE_BASE_URL.to_string())
    }

    pub fn log_file(&self) -> PathBuf {
        self.get_path("LOG_FILE")
            .unwrap_or_else(|| env::temp_dir().join("groovy_console").join("gconsole.log"))
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or GCONSOLE_* for forward-compat
    const KEYS: &[&str] = &[
        "EXECUTOR_URL",
        "CONSOLE_BASE_URL",
        "GITHUB_API_BASE",
        "GITHUB_RAW_BASE",
        "GITHUB_TOKEN",
        "STACKEXCHANGE_API_BASE",
        "REQUEST_TIMEOUT",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("GCONSOLE_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("groovy_console").join(".gconsolerc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Endpoints
    m.insert("EXECUTOR_URL".into(), DEFAULT_EXECUTOR_URL.into());
    m.insert("CONSOLE_BASE_URL".into(), DEFAULT_CONSOLE_BASE_URL.into());
    m.insert("GITHUB_API_BASE".into(), DEFAULT_GITHUB_API_BASE.into());
    m.insert("GITHUB_RAW_BASE".into(), DEFAULT_GITHUB_RAW_BASE.into());
    m.insert("STACKEXCHANGE_API_BASE".into(), DEFAULT_STACKEXCHANGE_API_BASE.into());

    // Numbers
    m.insert("REQUEST_TIMEOUT".into(), "60".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let cfg = Config::with_values(Vec::<(String, String)>::new());
        assert_eq!(cfg.executor_url(), DEFAULT_EXECUTOR_URL);
        assert_eq!(cfg.get("GITHUB_API_BASE").as_deref(), Some(DEFAULT_GITHUB_API_BASE));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        assert!(cfg.get("GITHUB_TOKEN").is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = Config::with_values([("REQUEST_TIMEOUT", "5"), ("EXECUTOR_URL", "http://127.0.0.1:9/run")]);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.executor_url(), "http://127.0.0.1:9/run");
    }

    #[test]
    fn unparsable_timeout_falls_back() {
        let cfg = Config::with_values([("REQUEST_TIMEOUT", "soon")]);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn only_known_keys_are_taken_from_env() {
        assert!(is_config_key("EXECUTOR_URL"));
        assert!(is_config_key("GCONSOLE_THEME"));
        assert!(!is_config_key("PATH"));
    }
}
