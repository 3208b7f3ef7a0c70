use serde::Serialize;
use sysinfo::System;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HostInfo {
    pub cpu_model: String,
    pub cpu_cores: usize,
    /// Compile-time OS identifier, e.g. `linux` or `macos`.
    pub platform: String,
    pub os_name: String,
    pub os_release: String,
    pub uptime_secs: u64,
}

pub struct HostProbe {
    sys: System,
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        HostProbe { sys }
    }

    pub fn read(&mut self) -> HostInfo {
        // Re-read so hot-plugged cores show up in the count.
        self.sys.refresh_cpu_all();
        let cpus = self.sys.cpus();

        HostInfo {
            cpu_model: cpus
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_default(),
            cpu_cores: cpus.len(),
            platform: std::env::consts::OS.to_string(),
            os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_release: System::os_version()
                .or_else(System::kernel_version)
                .unwrap_or_else(|| "unknown".to_string()),
            uptime_secs: System::uptime(),
        }
    }
}
