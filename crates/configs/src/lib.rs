use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Per-resource overrides; entries whose name matches no builtin resource declare a new one.
    #[serde(default)]
    pub resources: Vec<ResourceSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

/// What a store does when its backing file cannot be re-read.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailureSetting {
    ServeStale,
    Fail,
}

/// Optional overrides for one resource. Unset fields keep the builtin value.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResourceSettings {
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub required: Option<Vec<String>>,
    #[serde(default)]
    pub search_fields: Option<Vec<String>>,
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub end_of_day_upper_bound: Option<bool>,
    #[serde(default)]
    pub read_failure: Option<ReadFailureSetting>,
}

/// Top-level routes that a resource name would never win against.
pub const RESERVED_RESOURCE_NAMES: [&str; 3] = ["health", "metrics", "resources"];

fn default_log_format() -> String { "compact".into() }
fn default_data_dir() -> String { "data".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise defaults filled from `SERVER_HOST`, `SERVER_PORT` and `DATA_DIR`.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(_) => Self::from_env(),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            cfg.storage.data_dir = dir;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        for r in &self.resources {
            r.validate()?;
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        Ok(())
    }
}

impl ResourceSettings {
    fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("resources[].name must not be empty"));
        }
        if name.contains('/') {
            return Err(anyhow!("resource name `{name}` must be a single path segment"));
        }
        if RESERVED_RESOURCE_NAMES.contains(&name) {
            return Err(anyhow!("resource name `{name}` is reserved"));
        }
        if let Some(file) = &self.file {
            if file.trim().is_empty() || file.contains("..") || std::path::Path::new(file).is_absolute() {
                return Err(anyhow!("resource `{name}` has an invalid file name"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let mut cfg = parse("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.data_dir, "data");
        assert_eq!(cfg.server.log_format, "compact");
        assert!(cfg.resources.is_empty());
    }

    #[test]
    fn parses_resource_overrides() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8088
            log_format = "json"

            [storage]
            data_dir = "/var/lib/flatfile"

            [[resources]]
            name = "teacher"
            fields = ["specialty", "comments", "date", "student", "professional"]
            date_field = "date"
            end_of_day_upper_bound = true
            read_failure = "fail"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.storage.data_dir, "/var/lib/flatfile");
        let teacher = &cfg.resources[0];
        assert_eq!(teacher.date_field.as_deref(), Some("date"));
        assert_eq!(teacher.end_of_day_upper_bound, Some(true));
        assert_eq!(teacher.read_failure, Some(ReadFailureSetting::Fail));
        assert!(teacher.required.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = parse("[server]\nhost = \"\"\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[[resources]]\nname = \"a/b\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[[resources]]\nname = \"x\"\nfile = \"../etc/passwd\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_reserved_names_and_absolute_files() {
        for name in RESERVED_RESOURCE_NAMES {
            let mut cfg = parse(&format!("[[resources]]\nname = \" {name} \"\n")).unwrap();
            assert!(cfg.normalize_and_validate().is_err(), "{name} accepted");
        }

        let mut cfg = parse("[[resources]]\nname = \"room\"\nfile = \"/etc/rooms.json\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[[resources]]\nname = \"room\"\nfile = \"rooms.json\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_ok());
    }
}
