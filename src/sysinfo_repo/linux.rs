// Linux-specific readers: /proc/stat, /proc/diskstats, cpufreq bounds.
// Parsers are plain functions over file content so they run on any host.

use crate::error::{CollectError, Result};
use crate::models::{CpuStatCounters, CpuTimes, DiskIo};

pub(crate) const PROC_STAT: &str = "/proc/stat";
pub(crate) const PROC_DISKSTATS: &str = "/proc/diskstats";

/// Clock ticks per second used by /proc/stat. The kernel scales these fields to USER_HZ,
/// which is 100 on every mainstream architecture and equals `sysconf(_SC_CLK_TCK)` there.
const USER_HZ: f64 = 100.0;
/// /proc/diskstats always counts 512-byte sectors regardless of the device's sector size.
const SECTOR_SIZE: u64 = 512;

/// Contents of /proc/stat; `Ok(None)` where procfs does not exist.
pub(super) fn read_proc_stat() -> Result<Option<String>> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string(PROC_STAT)
            .map(Some)
            .map_err(|e| CollectError::io(PROC_STAT, e))
    }
    #[cfg(not(target_os = "linux"))]
    Ok(None)
}

/// Aggregate disk counters from /proc/diskstats; `Ok(None)` off Linux.
pub(super) fn read_disk_io() -> Result<Option<DiskIo>> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(PROC_DISKSTATS)
            .map_err(|e| CollectError::io(PROC_DISKSTATS, e))?;
        parse_diskstats(&content, is_whole_disk).map(Some)
    }
    #[cfg(not(target_os = "linux"))]
    Ok(None)
}

/// Whole devices have an entry in /sys/block; partitions only appear beneath their parent.
#[cfg(target_os = "linux")]
fn is_whole_disk(name: &str) -> bool {
    std::path::Path::new("/sys/block")
        .join(name.replace('/', "!"))
        .exists()
}

/// (min, max) frequency bounds in MHz for one logical core, 0.0 when unknown.
pub(super) fn read_cpu_freq_bounds(cpu_id: usize) -> (f64, f64) {
    #[cfg(target_os = "linux")]
    {
        let dir = format!("/sys/devices/system/cpu/cpu{}/cpufreq", cpu_id);
        let read_mhz = |file: &str| {
            std::fs::read_to_string(format!("{}/{}", dir, file))
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(|khz| khz / 1000.0)
                .unwrap_or(0.0)
        };
        (read_mhz("cpuinfo_min_freq"), read_mhz("cpuinfo_max_freq"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = cpu_id;
        (0.0, 0.0)
    }
}

/// CPU time classes from the aggregate `cpu` line of /proc/stat.
pub(crate) fn parse_cpu_times(content: &str) -> Result<CpuTimes> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| CollectError::parse(PROC_STAT, "missing aggregate cpu line"))?;
    let ticks: Vec<f64> = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| CollectError::parse(PROC_STAT, format!("cpu line: {}", e)))?;
    if ticks.len() < 4 {
        return Err(CollectError::parse(
            PROC_STAT,
            format!("cpu line has {} fields, expected at least 4", ticks.len()),
        ));
    }
    let secs = |i: usize| ticks.get(i).map(|t| t / USER_HZ);
    Ok(CpuTimes {
        user: ticks[0] / USER_HZ,
        system: ticks[2] / USER_HZ,
        idle: ticks[3] / USER_HZ,
        iowait: secs(4),
        irq: secs(5),
        softirq: secs(6),
    })
}

/// Context switch, interrupt and softirq totals from /proc/stat.
/// Linux has no syscall counter, so `syscalls` is always 0.
pub(crate) fn parse_cpu_stat_counters(content: &str) -> Result<CpuStatCounters> {
    let mut ctx_switches = None;
    let mut interrupts = None;
    let mut soft_interrupts = 0;
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(key), Some(total)) = (fields.next(), fields.next()) else {
            continue;
        };
        let slot = match key {
            "ctxt" => &mut ctx_switches,
            "intr" => &mut interrupts,
            "softirq" => {
                soft_interrupts = parse_counter(PROC_STAT, key, total)?;
                continue;
            }
            _ => continue,
        };
        *slot = Some(parse_counter(PROC_STAT, key, total)?);
    }
    Ok(CpuStatCounters {
        ctx_switches: ctx_switches
            .ok_or_else(|| CollectError::parse(PROC_STAT, "missing ctxt line"))?,
        interrupts: interrupts
            .ok_or_else(|| CollectError::parse(PROC_STAT, "missing intr line"))?,
        soft_interrupts,
        syscalls: 0,
    })
}

/// Sums sectors read/written over the devices accepted by `is_whole_disk`.
pub(crate) fn parse_diskstats(content: &str, is_whole_disk: impl Fn(&str) -> bool) -> Result<DiskIo> {
    let mut total = DiskIo::default();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // Pre-2.6.25 partition lines carry only 7 fields and no sector counts we can use.
        if fields.len() < 14 {
            continue;
        }
        let name = fields[2];
        if !is_whole_disk(name) {
            continue;
        }
        let read_sectors = parse_counter(PROC_DISKSTATS, name, fields[5])?;
        let write_sectors = parse_counter(PROC_DISKSTATS, name, fields[9])?;
        total.read_bytes = total
            .read_bytes
            .saturating_add(read_sectors.saturating_mul(SECTOR_SIZE));
        total.write_bytes = total
            .write_bytes
            .saturating_add(write_sectors.saturating_mul(SECTOR_SIZE));
    }
    Ok(total)
}

fn parse_counter(path: &str, key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| CollectError::parse(path, format!("{}: {:?}: {}", key, value, e)))
}
