// CPU identity and utilisation

use serde::{Deserialize, Serialize};

/// Placeholder used when /proc/cpuinfo has no matching key.
pub const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub modelname: String,
    pub cpumhz: String,
    /// Busy share of the sampling window, in percent.
    pub usage: f64,
}

/// One reading of the aggregate `cpu` line of /proc/stat, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSample {
    pub total: u64,
    pub idle: u64,
    pub iowait: u64,
}
