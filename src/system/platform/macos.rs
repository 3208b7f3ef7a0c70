use super::PlatformExtensions;
use crate::system::cpu::CoreTicks;

pub struct Platform;

impl PlatformExtensions for Platform {
    #[allow(deprecated)] // libc points at the mach2 crate for these
    fn cpu_ticks() -> Option<Vec<(usize, CoreTicks)>> {
        let mut cpu_count: libc::natural_t = 0;
        let mut info: libc::processor_info_array_t = std::ptr::null_mut();
        let mut info_count: libc::mach_msg_type_number_t = 0;

        let kr = unsafe {
            libc::host_processor_info(
                libc::mach_host_self(),
                libc::PROCESSOR_CPU_LOAD_INFO,
                &mut cpu_count,
                &mut info,
                &mut info_count,
            )
        };
        if kr != libc::KERN_SUCCESS || info.is_null() {
            return None;
        }

        let loads = unsafe {
            std::slice::from_raw_parts(
                info as *const libc::processor_cpu_load_info,
                cpu_count as usize,
            )
        };
        let cores = loads
            .iter()
            .enumerate()
            .map(|(id, load)| {
                let ticks = load.cpu_ticks;
                let user = u64::from(ticks[libc::CPU_STATE_USER as usize]);
                let system = u64::from(ticks[libc::CPU_STATE_SYSTEM as usize]);
                let idle = u64::from(ticks[libc::CPU_STATE_IDLE as usize]);
                let nice = u64::from(ticks[libc::CPU_STATE_NICE as usize]);
                let core = CoreTicks {
                    idle,
                    total: user + system + idle + nice,
                };
                (id, core)
            })
            .collect();

        // The kernel hands us a VM allocation that we own.
        unsafe {
            libc::vm_deallocate(
                libc::mach_task_self(),
                info as libc::vm_address_t,
                (info_count as usize * std::mem::size_of::<libc::integer_t>()) as libc::vm_size_t,
            );
        }

        Some(cores)
    }

    fn has_page_accounting() -> bool {
        true
    }
}
