// Pure parsers for /proc files and `free` output.

use crate::error::{Error, Result};
use crate::models::{
    CpuSample, MemSection, MemoryStats, NOT_AVAILABLE, SwapSection, TotalSection,
};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Highest device number handed out by [`next_free_device`].
pub const MAX_DEVICE_NUMBER: u32 = 255;

/// /proc/cpuinfo keys (whitespace removed) that may carry the model name, in priority order.
pub const CPU_MODEL_KEYS: [&str; 4] = ["modelname", "cpumodel", "Processor", "Hardware"];

const CPU_MHZ_KEY: &str = "cpuMHz";

static MEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Mem:\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s*$")
        .expect("valid Mem: regex")
});
static SWAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Swap:\s+(\d+)\s+(\d+)\s+(\d+)\s*$").expect("valid Swap: regex")
});
static TOTAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Total:\s+(\d+)\s+(\d+)\s+(\d+)\s*$").expect("valid Total: regex")
});

/// First token of /proc/uptime, in seconds.
pub fn parse_uptime(content: &str) -> Result<f64> {
    let token = content
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::Parse("/proc/uptime is empty".into()))?;
    token
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("/proc/uptime '{}': {}", token, e)))
}

/// First three fields of /proc/loadavg as "a, b, c".
pub fn parse_load_average(content: &str) -> Result<String> {
    let fields: Vec<&str> = content.split_whitespace().take(3).collect();
    if fields.len() < 3 {
        return Err(Error::OutOfRange {
            what: "/proc/loadavg",
            needed: 3,
            got: fields.len(),
        });
    }
    Ok(format!("{}, {}, {}", fields[0], fields[1], fields[2]))
}

fn capture_fields<const N: usize>(re: &Regex, line: &str) -> Option<[u64; N]> {
    let caps = re.captures(line)?;
    let mut out = [0u64; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    Some(out)
}

/// Parse `free -b -t -w` output. A section whose line is missing or malformed stays zero.
pub fn parse_memory_stats<S: AsRef<str>>(lines: &[S]) -> MemoryStats {
    let mut stats = MemoryStats::default();
    for line in lines.iter().map(AsRef::as_ref) {
        if let Some([total, used, free, shared, buffers, cache, available]) =
            capture_fields::<7>(&MEM_LINE, line)
        {
            stats.mem = MemSection {
                total,
                used,
                free,
                shared,
                buffers,
                cache,
                available,
            };
        } else if let Some([total, used, free]) = capture_fields::<3>(&SWAP_LINE, line) {
            stats.swap = SwapSection { total, used, free };
        } else if let Some([total, used, free]) = capture_fields::<3>(&TOTAL_LINE, line) {
            stats.total = TotalSection { total, used, free };
        }
    }
    stats
}

/// Colon-delimited key/value pairs of /proc/cpuinfo. Whitespace inside keys is dropped
/// ("model name" becomes "modelname"); keys stay case-sensitive and the first occurrence wins.
pub fn parse_cpuinfo(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key: String = key.chars().filter(|c| !c.is_whitespace()).collect();
        if key.is_empty() {
            continue;
        }
        map.entry(key).or_insert_with(|| value.trim().to_string());
    }
    map
}

pub fn cpu_model_name(cpuinfo: &HashMap<String, String>) -> String {
    CPU_MODEL_KEYS
        .iter()
        .find_map(|k| cpuinfo.get(*k))
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn cpu_mhz(cpuinfo: &HashMap<String, String>) -> String {
    cpuinfo
        .get(CPU_MHZ_KEY)
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Parse the aggregate `cpu` line of /proc/stat.
///
/// The line is split on single spaces and the first two tokens (label and the empty
/// field after the double space) are dropped. Of the remaining fields, idle is index 3
/// and iowait index 4; total is the sum of all of them.
pub fn parse_cpu_sample(line: &str) -> Result<CpuSample> {
    let fields = line
        .trim_end()
        .split(' ')
        .skip(2)
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| Error::Parse(format!("/proc/stat field '{}': {}", f, e)))
        })
        .collect::<Result<Vec<u64>>>()?;
    if fields.len() < 5 {
        return Err(Error::OutOfRange {
            what: "/proc/stat cpu line",
            needed: 5,
            got: fields.len(),
        });
    }
    Ok(CpuSample {
        total: fields.iter().sum(),
        idle: fields[3],
        iowait: fields[4],
    })
}

/// `((Δtotal − Δiowait − Δidle) / Δtotal) × 100`, or 0 when no time elapsed.
pub fn cpu_usage(prev: &CpuSample, cur: &CpuSample) -> f64 {
    let dtotal = cur.total.saturating_sub(prev.total);
    if dtotal == 0 {
        return 0.0;
    }
    let didle = cur.idle.saturating_sub(prev.idle);
    let diowait = cur.iowait.saturating_sub(prev.iowait);
    let busy = dtotal.saturating_sub(diowait).saturating_sub(didle);
    (busy as f64 * 100.0) / dtotal as f64
}

/// Whitespace-delimited key/value lines as in /etc/login.defs. `#` lines are comments.
pub fn parse_login_defs(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let (key, value) = l.split_once(char::is_whitespace)?;
            let value = value.trim();
            (!value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Lowest `<name><n>` with n in 0..=255 not among `in_use`.
pub fn next_free_device<'a, I>(name: &str, in_use: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let used: BTreeSet<u32> = in_use
        .into_iter()
        .filter_map(|dev| dev.trim().strip_prefix(name))
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|n| n.parse().ok())
        .collect();
    (0..=MAX_DEVICE_NUMBER)
        .find(|n| !used.contains(n))
        .map(|n| format!("{}{}", name, n))
}
