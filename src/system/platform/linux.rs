use super::PlatformExtensions;
use crate::system::cpu::CoreTicks;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>> {
        let contents = std::fs::read_to_string("/proc/stat").ok()?;
        let cores = parse_proc_stat(&contents);
        if cores.is_empty() { None } else { Some(cores) }
    }

    fn has_page_accounting() -> bool {
        false
    }
}

/// Parse the per-core `cpuN` lines of `/proc/stat`, skipping the aggregate `cpu` line.
///
/// Offline cores have no row, so ids can have gaps.
pub fn parse_proc_stat(contents: &str) -> Vec<(usize, CoreTicks)> {
    let mut cores = Vec::new();
    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        // "cpu" alone is the aggregate; per-core rows are "cpu0", "cpu1", ...
        let Some(id) = label.strip_prefix("cpu").and_then(|n| n.parse::<usize>().ok()) else {
            continue;
        };
        // user nice system idle iowait irq softirq steal guest guest_nice
        let values: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
        if values.len() < 4 {
            continue;
        }
        let field = |i: usize| values.get(i).copied().unwrap_or(0);
        // user + nice + system + idle + irq; iowait, softirq and steal are in neither
        let idle = field(3);
        let total = field(0) + field(1) + field(2) + idle + field(5);
        cores.push((id, CoreTicks { idle, total }));
    }
    cores
}
