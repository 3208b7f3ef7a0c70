use std::io::Write;

use color_eyre::Result;
use crossterm::style::Stylize;
use serde::Serialize;

use crate::format::{format_gib, format_percent, format_uptime_hours};
use crate::system::cpu::CpuUsage;
use crate::system::host::HostInfo;
use crate::system::memory::MemoryInfo;

/// Everything one refresh cycle shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub host: HostInfo,
    pub cpu: CpuUsage,
    pub memory: MemoryInfo,
    /// Watch period in seconds, present only in watch mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_secs: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
    pub per_core: bool,
}

struct Painter {
    color: bool,
}

impl Painter {
    fn heading(&self, text: &str) -> String {
        if self.color {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: String) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text
        }
    }

    fn dim(&self, text: String) -> String {
        if self.color {
            text.dim().to_string()
        } else {
            text
        }
    }
}

pub fn render_text<W: Write>(out: &mut W, report: &Report, opts: RenderOptions) -> Result<()> {
    let p = Painter { color: opts.color };
    let host = &report.host;

    writeln!(out, "{}", p.heading("CPU Information:"))?;
    writeln!(out, "Model: {}", host.cpu_model)?;
    writeln!(out, "Cores: {}", host.cpu_cores)?;
    writeln!(out, "Usage: {}%", p.value(format_percent(report.cpu.percent)))?;
    if opts.per_core {
        for (idx, percent) in report.cpu.per_core.iter().enumerate() {
            writeln!(out, "Core {idx}: {}%", p.value(format_percent(*percent)))?;
        }
    }

    let basic = report.memory.basic();
    writeln!(out)?;
    writeln!(out, "{}", p.heading("Memory Information:"))?;
    writeln!(out, "Total: {} GB", p.value(format_gib(basic.total)))?;
    writeln!(out, "Used: {} GB (Active)", p.value(format_gib(basic.used)))?;
    writeln!(out, "Available: {} GB", p.value(format_gib(basic.available)))?;
    if let MemoryInfo::Detailed(detailed) = &report.memory {
        writeln!(out, "Wired: {} GB (System)", p.value(format_gib(detailed.wired)))?;
        writeln!(out, "Active: {} GB (Apps)", p.value(format_gib(detailed.active)))?;
        writeln!(out, "Inactive: {} GB (Cached)", p.value(format_gib(detailed.inactive)))?;
    }
    writeln!(out, "Usage: {}%", p.value(format_percent(basic.usage_percent)))?;

    writeln!(out)?;
    writeln!(out, "{}", p.heading("System Information:"))?;
    writeln!(out, "Platform: {}", host.platform)?;
    writeln!(out, "OS: {} {}", host.os_name, host.os_release)?;
    writeln!(out, "Uptime: {} hours", format_uptime_hours(host.uptime_secs))?;

    if let Some(secs) = report.refresh_secs {
        writeln!(out)?;
        writeln!(out, "{}", p.dim(format!("Refresh: {secs} seconds")))?;
    }
    Ok(())
}

/// One compact JSON object per line.
pub fn render_json<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
