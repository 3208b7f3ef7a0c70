use super::cpu::CoreTicks;

/// Per-OS hooks the samplers depend on.
pub trait PlatformExtensions {
    /// Cumulative tick counters keyed by core id, `None` when the OS facility is unreadable.
    fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>>;
    /// Whether `vm_stat`-style page accounting is available.
    fn has_page_accounting() -> bool;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod unsupported;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
use unsupported as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

/// Command that prints page-level memory statistics.
pub const PAGE_STATS_COMMAND: &str = "vm_stat";

pub fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>> {
    platform_impl::Platform::cpu_ticks()
}

pub fn has_page_accounting() -> bool {
    platform_impl::Platform::has_page_accounting()
}
