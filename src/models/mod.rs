// Result records returned by the stats repo and the HTTP API

mod cpu;
mod memory;
mod mount;
mod uptime;

pub use cpu::{CpuSample, CpuStats, NOT_AVAILABLE};
pub use memory::{MemSection, MemoryStats, SwapSection, TotalSection};
pub use mount::{
    CreateParams, MountRequest, MountStatus, OptionsInput, UmountParams, UnlinkParams,
};
pub use uptime::{Uptime, UptimeStats};
