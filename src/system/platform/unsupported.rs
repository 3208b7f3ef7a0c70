use super::PlatformExtensions;
use crate::system::cpu::CoreTicks;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>> {
        None
    }

    fn has_page_accounting() -> bool {
        false
    }
}
