use windows_sys::Win32::Foundation::FILETIME;
use windows_sys::Win32::System::Threading::GetSystemTimes;

use super::PlatformExtensions;
use crate::system::cpu::CoreTicks;

pub struct Platform;

fn filetime_to_u64(ft: &FILETIME) -> u64 {
    (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
}

impl PlatformExtensions for Platform {
    fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>> {
        let mut idle = FILETIME {
            dwLowDateTime: 0,
            dwHighDateTime: 0,
        };
        let mut kernel = idle;
        let mut user = idle;

        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return None;
        }

        // Only system-wide times are exposed here, so report one aggregate core.
        // Kernel time already includes idle time.
        let ticks = CoreTicks {
            idle: filetime_to_u64(&idle),
            total: filetime_to_u64(&kernel) + filetime_to_u64(&user),
        };
        Some(vec![(0, ticks)])
    }

    fn has_page_accounting() -> bool {
        false
    }
}
