// Host telemetry from /proc and util commands

mod parse;

pub use parse::{
    CPU_MODEL_KEYS, MAX_DEVICE_NUMBER, cpu_mhz, cpu_model_name, cpu_usage, next_free_device,
    parse_cpu_sample, parse_cpuinfo, parse_load_average, parse_login_defs, parse_memory_stats,
    parse_uptime,
};

use crate::command::{Command, Executor, SystemExecutor};
use crate::error::{Error, Result};
use crate::models::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::instrument;

/// Legacy kernel alias for the root filesystem device.
pub const LEGACY_ROOT_DEVICE: &str = "/dev/root";

/// Default pause between the two /proc/stat samples.
pub const DEFAULT_CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Device file backing `/`, resolved once per process.
static ROOT_DEVICE_FILE: OnceLock<String> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Block devices listed in /proc/partitions.
    Disk,
    /// Network interfaces listed in /proc/net/dev.
    Iface,
}

/// `exact`: equality; otherwise `device` must be a prefix of the root device file
/// (`/dev/sda` matches a root on `/dev/sda1`).
pub fn matches_root_device(root_device: &str, device: &str, exact: bool) -> bool {
    if device == LEGACY_ROOT_DEVICE {
        return true;
    }
    if exact {
        root_device == device
    } else {
        root_device.starts_with(device)
    }
}

/// Stateless telemetry queries. Every call reads the live system; nothing is cached
/// except the root device file.
pub struct StatsRepo {
    executor: Arc<dyn Executor>,
    root: PathBuf,
    cpu_sample_interval: Duration,
}

impl Default for StatsRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRepo {
    pub fn new() -> Self {
        Self::with_executor(Arc::new(SystemExecutor))
    }

    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            root: PathBuf::from("/"),
            cpu_sample_interval: DEFAULT_CPU_SAMPLE_INTERVAL,
        }
    }

    /// Resolve /proc and /etc below `root` instead of `/`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_cpu_sample_interval(mut self, interval: Duration) -> Self {
        self.cpu_sample_interval = interval;
        self
    }

    fn host_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn read(&self, rel: &str) -> Result<String> {
        let path = self.host_path(rel);
        std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
    }

    /// Device file mounted at `/`, e.g. `/dev/sda1`. Only the first successful lookup runs
    /// `findmnt`; later calls in this process reuse it.
    #[instrument(skip(self), fields(repo = "stats", operation = "get_root_device_file"))]
    pub fn get_root_device_file(&self) -> Result<String> {
        if let Some(dev) = ROOT_DEVICE_FILE.get() {
            return Ok(dev.clone());
        }
        let output = self
            .executor
            .execute(&Command::new("findmnt").args(["-f", "-n", "-o", "SOURCE", "/"]))?;
        let dev = output
            .lines
            .first()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| Error::Parse("findmnt returned no source for /".into()))?;
        // A racing caller may have won; both resolved the same device.
        Ok(ROOT_DEVICE_FILE.get_or_init(|| dev).clone())
    }

    pub fn is_root_device_file(&self, device: &str, exact: bool) -> Result<bool> {
        if device == LEGACY_ROOT_DEVICE {
            return Ok(true);
        }
        let root = self.get_root_device_file()?;
        Ok(matches_root_device(&root, device, exact))
    }

    /// /etc/login.defs as a map, or `None` if the file cannot be read.
    pub fn get_login_defs(&self) -> Option<HashMap<String, String>> {
        match self.read("etc/login.defs") {
            Ok(content) => Some(parse_login_defs(&content)),
            Err(e) => {
                tracing::warn!(error = %e, "login.defs unavailable");
                None
            }
        }
    }

    /// Next unused `<name><n>` (n in 0..=255) for the given device class, `None` if all are taken.
    #[instrument(skip(self), fields(repo = "stats", operation = "get_next_device"))]
    pub fn get_next_device(&self, kind: DeviceKind, name: &str) -> Result<Option<String>> {
        let cmd = match kind {
            DeviceKind::Disk => Command::new("awk")
                .arg("{print $4}")
                .arg(path_arg(&self.host_path("proc/partitions"))),
            DeviceKind::Iface => Command::new("awk")
                .args(["-F:", "/:/ {print $1}"])
                .arg(path_arg(&self.host_path("proc/net/dev"))),
        };
        let output = self.executor.execute(&cmd)?;
        let next = next_free_device(name, output.lines.iter().map(String::as_str));
        if next.is_none() {
            tracing::warn!(name, "no free device number left");
        }
        Ok(next)
    }

    /// Uptime as a record (`indexed`) or as a sentence.
    pub fn uptime(&self, indexed: bool) -> Result<Uptime> {
        let stats = self.uptime_stats()?;
        Ok(if indexed {
            Uptime::Indexed(stats)
        } else {
            Uptime::Formatted(stats.to_string())
        })
    }

    pub fn uptime_stats(&self) -> Result<UptimeStats> {
        let raw = parse_uptime(&self.read("proc/uptime")?)?;
        Ok(UptimeStats::from_seconds(raw))
    }

    /// 1, 5 and 15 minute load as "a, b, c".
    pub fn get_load_average(&self) -> Result<String> {
        parse_load_average(&self.read("proc/loadavg")?)
    }

    #[instrument(skip(self), fields(repo = "stats", operation = "get_memory_stats"))]
    pub fn get_memory_stats(&self) -> Result<MemoryStats> {
        let output = self
            .executor
            .execute(&Command::new("free").args(["-b", "-t", "-w"]))?;
        let stats = parse_memory_stats(&output.lines);
        if stats.mem == MemSection::default() {
            tracing::warn!("free output had no parseable Mem: line");
        }
        Ok(stats)
    }

    /// Model name, clock and usage. Blocks for the sample interval (one second by default)
    /// between the two /proc/stat readings.
    #[instrument(skip(self), fields(repo = "stats", operation = "get_cpu_stats"))]
    pub fn get_cpu_stats(&self) -> Result<CpuStats> {
        let cpuinfo = match self.read("proc/cpuinfo") {
            Ok(content) => parse_cpuinfo(&content),
            Err(e) => {
                tracing::warn!(error = %e, "cpuinfo unavailable");
                HashMap::new()
            }
        };

        let first = self.sample_cpu()?;
        std::thread::sleep(self.cpu_sample_interval);
        let second = self.sample_cpu()?;

        Ok(CpuStats {
            modelname: cpu_model_name(&cpuinfo),
            cpumhz: cpu_mhz(&cpuinfo),
            usage: cpu_usage(&first, &second),
        })
    }

    fn sample_cpu(&self) -> Result<CpuSample> {
        let content = self.read("proc/stat")?;
        let line = content
            .lines()
            .next()
            .ok_or_else(|| Error::Parse("/proc/stat is empty".into()))?;
        parse_cpu_sample(line)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
