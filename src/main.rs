use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use netdimm_panel::core::catalog::JsonInventory;
use netdimm_panel::core::config::{Overrides, load_config, resolve};
use netdimm_panel::handlers::Devices;
use netdimm_panel::panel::{Panel, TerminalPanel};
use netdimm_panel::runtime::Runtime;
use netdimm_panel::system::{ShellSystem, service};
use netdimm_panel::transfer::LoggingClient;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "netdimm-panel", version, about = "Front-panel menu for loading NetDIMM targets")]
struct Args {
    /// Config file (default: ~/.netdimm-panel/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the payload files
    #[arg(long)]
    rom_dir: Option<PathBuf>,

    /// Target address; repeat for several
    #[arg(short, long = "target")]
    targets: Vec<String>,

    #[arg(long, default_value = "netdimm-panel.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t, value_enum)]
    log_level: LogLevel,

    /// Log system commands instead of running them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> std::io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The terminal panel owns stdout, so logs go to a file
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(args.log_level.into(), log_config, log_file);
    }

    let file_config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            eprintln!("netdimm-panel: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let config = resolve(
        &file_config,
        &Overrides {
            rom_dir: args.rom_dir,
            targets: args.targets,
        },
    );
    info!(
        "netdimm-panel {} starting: roms in {}, targets {:?}",
        env!("CARGO_PKG_VERSION"),
        config.rom_dir.display(),
        config.targets
    );

    // Before any thread exists, so every thread inherits the mask
    service::block_termination_signals()?;

    let mut panel = TerminalPanel::new();
    service::spawn_signal_watcher(panel.release_hook())?;
    let mut transfer = LoggingClient::new();
    let mut system = ShellSystem::new(args.dry_run);
    let inventory = JsonInventory::new(config.catalog_path.clone());

    let started = Runtime::start(
        Devices {
            panel: &mut panel,
            transfer: &mut transfer,
            system: &mut system,
            inventory: &inventory,
        },
        &config,
    );
    let code = match started {
        Ok(mut runtime) => {
            service::notify_ready();
            runtime.run();
            if let Err(e) = runtime.shutdown() {
                error!("Panel teardown failed: {}", e);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Panel failed to start: {}", e);
            // Initialization may have got partway, so restore the display.
            if let Err(err) = panel.teardown() {
                error!("Panel teardown failed: {}", err);
            }
            eprintln!("netdimm-panel: {e}");
            ExitCode::FAILURE
        }
    };

    info!("netdimm-panel exiting");
    Ok(code)
}
