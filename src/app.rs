use std::io::{Stdout, Write};

use color_eyre::Result;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::config::{Config, OutputFormat};
use crate::report::{RenderOptions, Report, render_json, render_text};
use crate::system::cpu::CpuSampler;
use crate::system::host::HostProbe;
use crate::system::memory::MemorySampler;
use crate::watch::Cycle;

pub struct App<W: Write = Stdout> {
    config: Config,
    cpu: CpuSampler,
    memory: MemorySampler,
    host: HostProbe,
    out: W,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_writer(config, std::io::stdout())
    }
}

impl<W: Write> App<W> {
    pub fn with_writer(config: Config, out: W) -> Self {
        let memory = MemorySampler::default();
        tracing::debug!(strategy = ?memory.strategy(), "memory sampler ready");
        App {
            config,
            cpu: CpuSampler::default(),
            memory,
            host: HostProbe::new(),
            out,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Sample everything once. Takes at least the configured CPU window.
    pub async fn collect(&mut self) -> Report {
        let host = self.host.read();
        let cpu = self.cpu.sample(self.config.cpu_window).await;
        let memory = self.memory.sample();

        Report {
            host,
            cpu,
            memory,
            refresh_secs: self.config.watch.map(|period| period.as_secs_f64()),
        }
    }

    pub fn render(&mut self, report: &Report) -> Result<()> {
        match self.config.format {
            OutputFormat::Json => render_json(&mut self.out, report)?,
            OutputFormat::Text => {
                if self.config.watch.is_some() {
                    queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                }
                let opts = RenderOptions {
                    color: self.config.color,
                    per_core: self.config.per_core,
                };
                render_text(&mut self.out, report, opts)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Cycle for App<W> {
    async fn run_once(&mut self) -> Result<()> {
        let report = self.collect().await;
        self.render(&report)
    }
}
