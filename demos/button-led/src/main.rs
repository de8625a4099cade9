mod console;

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ao::{App, SystemConfig, TraceRecord};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use pq::{Overflow, Strategy};

use console::{ConsoleLeds, ConsoleLogger, ScriptedButton};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Heap,
    List,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OverflowArg {
    Reject,
    EvictLowest,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scripted button presses driving the RGB LED active objects")]
struct Opts {
    /// Hold time of each press in milliseconds
    #[arg(long, value_delimiter = ',', default_value = "300,1200,2500")]
    presses: Vec<u64>,

    /// Idle time between presses in milliseconds
    #[arg(long, default_value_t = 100)]
    gap_ms: u64,

    /// JSON file with a system configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    #[arg(long, value_enum)]
    overflow: Option<OverflowArg>,

    /// LED on-time in milliseconds
    #[arg(long)]
    led_on_ms: Option<u64>,

    /// Print trace records
    #[arg(long)]
    trace: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Opts {
    fn system_config(&self) -> Result<SystemConfig> {
        let mut config: SystemConfig = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SystemConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = match strategy {
                StrategyArg::Heap => Strategy::Heap,
                StrategyArg::List => Strategy::List,
            };
        }
        if let Some(overflow) = self.overflow {
            config.overflow = match overflow {
                OverflowArg::Reject => Overflow::Reject,
                OverflowArg::EvictLowest => Overflow::EvictLowest,
            };
        }
        if let Some(ms) = self.led_on_ms {
            config.led_on_duration = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    ConsoleLogger::install(opts.log_level())?;
    let config = opts.system_config()?;

    let period = config.button_period.as_millis().max(1) as u64;
    let presses: Vec<usize> = opts
        .presses
        .iter()
        .map(|ms| (ms / period) as usize)
        .collect();
    let button = ScriptedButton::new(&presses, (opts.gap_ms / period) as usize);
    let remaining = button.remaining();

    let mut builder = App::with_config(config.clone());
    if opts.trace {
        builder = builder.with_trace_hook(Arc::new(|record: &TraceRecord| {
            log::info!("[TRACE] {record:?}");
        }));
    }
    let app = builder.start(ConsoleLeds)?;
    let sampler = app.attach_button(button)?;

    while remaining.load(Ordering::Acquire) > 0 {
        thread::sleep(config.button_period);
    }
    sampler.stop();

    // Let the LED actor work through the backlog.
    while app.dispatcher().is_running() || !app.requests().is_empty() {
        thread::sleep(config.led_poll_timeout);
    }
    thread::sleep(config.led_on_duration);
    app.shutdown();
    Ok(())
}
