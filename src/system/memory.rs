use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::Serialize;
use sysinfo::System;

use super::command::{CommandRunner, SystemCommand};
use super::platform;

/// Bytes per page as reported by `vm_stat`.
pub const PAGE_SIZE: u64 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BasicMemory {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub usage_percent: f64,
}

impl BasicMemory {
    pub fn from_total_and_free(total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        Self {
            total,
            used,
            available: free,
            usage_percent: percent_of(used, total),
        }
    }
}

/// Page-accounted breakdown. `used` is wired + active and `available` is
/// free + inactive, so they need not sum to `total`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DetailedMemory {
    #[serde(flatten)]
    pub basic: BasicMemory,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
}

impl DetailedMemory {
    pub fn from_page_stats(total: u64, pages: &PageStats) -> Self {
        let used = pages.wired.saturating_add(pages.active);
        Self {
            basic: BasicMemory {
                total,
                used,
                available: pages.free.saturating_add(pages.inactive),
                usage_percent: percent_of(used, total),
            },
            active: pages.active,
            inactive: pages.inactive,
            wired: pages.wired,
        }
    }

    /// Basic figures with an all-zero breakdown.
    pub fn without_breakdown(basic: BasicMemory) -> Self {
        Self {
            basic,
            active: 0,
            inactive: 0,
            wired: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemoryInfo {
    Basic(BasicMemory),
    Detailed(DetailedMemory),
}

impl MemoryInfo {
    pub fn basic(&self) -> &BasicMemory {
        match self {
            MemoryInfo::Basic(basic) => basic,
            MemoryInfo::Detailed(detailed) => &detailed.basic,
        }
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Byte counts pulled out of `vm_stat` output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageStats {
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
}

/// Split a `<label>:<whitespace><value>.` line. The label runs up to the last
/// colon that still leaves a well-formed value behind it.
fn split_stat_line(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_suffix('.')?;
    body.rmatch_indices(':').find_map(|(idx, _)| {
        let label = &body[..idx];
        let value = &body[idx + 1..];
        let mut chars = value.chars();
        let leads_with_space = chars.next().is_some_and(char::is_whitespace);
        (!label.is_empty() && leads_with_space && chars.next().is_some()).then_some((label, value))
    })
}

/// Digits only; `"1,234"` and `" 1 234"` both read as 1234.
fn parse_page_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parse page-statistics text into byte counts.
///
/// Lines that are not shaped like `Label:   1234.` are skipped and missing
/// labels read as zero. Fails only when no line has that shape at all.
pub fn parse_page_stats(text: &str) -> Result<PageStats> {
    let mut stats = PageStats::default();
    let mut matched = 0usize;

    for line in text.lines() {
        let Some((label, raw)) = split_stat_line(line) else {
            continue;
        };
        matched += 1;

        let slot = match label {
            "Pages free" => &mut stats.free,
            "Pages active" => &mut stats.active,
            "Pages inactive" => &mut stats.inactive,
            "Pages wired down" => &mut stats.wired,
            _ => continue,
        };
        if let Some(pages) = parse_page_count(raw) {
            *slot = pages.saturating_mul(PAGE_SIZE);
        }
    }

    if matched == 0 {
        return Err(eyre!("no page statistics found in command output"));
    }
    Ok(stats)
}

/// Raw OS figures in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMemory {
    pub total: u64,
    pub free: u64,
}

pub trait MemoryProbe {
    fn read(&mut self) -> RawMemory;
}

pub struct SysinfoProbe {
    sys: System,
    free_pages_only: bool,
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProbe {
    pub fn new() -> Self {
        SysinfoProbe {
            sys: System::new(),
            // page-accounting hosts report truly free pages, not reclaimable memory
            free_pages_only: platform::has_page_accounting(),
        }
    }
}

/// Pick the "free" figure: free pages on page-accounting hosts, otherwise the
/// OS estimate of available memory (free pages when that estimate is missing).
fn reported_free(available: u64, free: u64, free_pages_only: bool) -> u64 {
    if free_pages_only || available == 0 {
        free
    } else {
        available
    }
}

impl MemoryProbe for SysinfoProbe {
    fn read(&mut self) -> RawMemory {
        self.sys.refresh_memory();
        let free = reported_free(
            self.sys.available_memory(),
            self.sys.free_memory(),
            self.free_pages_only,
        );
        RawMemory {
            total: self.sys.total_memory(),
            free,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryStrategy {
    Basic,
    PageAccounting,
}

impl MemoryStrategy {
    pub fn detect() -> Self {
        if platform::has_page_accounting() {
            MemoryStrategy::PageAccounting
        } else {
            MemoryStrategy::Basic
        }
    }
}

pub struct MemorySampler<P = SysinfoProbe, R = SystemCommand> {
    probe: P,
    runner: R,
    strategy: MemoryStrategy,
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new(SysinfoProbe::new(), SystemCommand, MemoryStrategy::detect())
    }
}

impl<P: MemoryProbe, R: CommandRunner> MemorySampler<P, R> {
    pub fn new(probe: P, runner: R, strategy: MemoryStrategy) -> Self {
        Self {
            probe,
            runner,
            strategy,
        }
    }

    pub fn strategy(&self) -> MemoryStrategy {
        self.strategy
    }

    pub fn sample(&mut self) -> MemoryInfo {
        let raw = self.probe.read();
        let basic = BasicMemory::from_total_and_free(raw.total, raw.free);

        match self.strategy {
            MemoryStrategy::Basic => MemoryInfo::Basic(basic),
            MemoryStrategy::PageAccounting => {
                let pages = self
                    .runner
                    .run(platform::PAGE_STATS_COMMAND)
                    .and_then(|text| parse_page_stats(&text));
                match pages {
                    Ok(pages) => {
                        MemoryInfo::Detailed(DetailedMemory::from_page_stats(raw.total, &pages))
                    }
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "page statistics unavailable, using basic memory figures"
                        );
                        MemoryInfo::Detailed(DetailedMemory::without_breakdown(basic))
                    }
                }
            }
        }
    }
}
