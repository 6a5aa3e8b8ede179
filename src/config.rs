use serde::Deserialize;

/// Environment variable that overrides `mount.base_dir`.
pub const MOUNT_DIR_ENV: &str = "MOUNT_DIR";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub mount: MountConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountConfig {
    /// Directory that filesystem mountpoints are created under.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

fn default_base_dir() -> String {
    "/srv".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Filesystem root that /proc and /etc are read from.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Pause between the two /proc/stat samples of a CPU reading.
    #[serde(default = "default_cpu_sample_interval_ms")]
    pub cpu_sample_interval_ms: u64,
    #[serde(default = "default_stream_frequency_ms")]
    pub cpu_stats_frequency_ms: u64,
    #[serde(default = "default_stream_frequency_ms")]
    pub memory_stats_frequency_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            cpu_sample_interval_ms: default_cpu_sample_interval_ms(),
            cpu_stats_frequency_ms: default_stream_frequency_ms(),
            memory_stats_frequency_ms: default_stream_frequency_ms(),
        }
    }
}

fn default_root_dir() -> String {
    "/".into()
}

fn default_cpu_sample_interval_ms() -> u64 {
    1000
}

fn default_stream_frequency_ms() -> u64 {
    2000
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let mut config = Self::load_from_str(&s)?;
        if let Ok(dir) = std::env::var(MOUNT_DIR_ENV) {
            config.mount.base_dir = dir;
            config.validate()?;
        }
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.mount.base_dir.starts_with('/'),
            "mount.base_dir must be an absolute path, got {:?}",
            self.mount.base_dir
        );
        anyhow::ensure!(
            !self.stats.root_dir.is_empty(),
            "stats.root_dir must be non-empty"
        );
        anyhow::ensure!(
            self.stats.cpu_stats_frequency_ms > 0,
            "stats.cpu_stats_frequency_ms must be > 0, got {}",
            self.stats.cpu_stats_frequency_ms
        );
        anyhow::ensure!(
            self.stats.memory_stats_frequency_ms > 0,
            "stats.memory_stats_frequency_ms must be > 0, got {}",
            self.stats.memory_stats_frequency_ms
        );
        Ok(())
    }
}
