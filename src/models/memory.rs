// Memory and swap totals as reported by `free -b -t -w`

use serde::{Deserialize, Serialize};

/// The `Mem:` line, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemSection {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub shared: u64,
    pub buffers: u64,
    pub cache: u64,
    pub available: u64,
}

/// The `Swap:` line, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSection {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// The `Total:` line (memory plus swap), in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalSection {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Sections whose line could not be parsed stay all-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub mem: MemSection,
    pub swap: SwapSection,
    pub total: TotalSection,
}
