use c64db::bus::RomSet;
use c64db::config::{LocalConfig, Machine, MonitorConfig, RemoteConfig};
use c64db::debug::{Breakpoint, Breakpoints, DebugEvent};
use c64db::engine::{Backend, LocalEngine};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    /// Log debug output.
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a program on the built-in interpreter until it stops.
    Run {
        /// The program file (load address followed by contents).
        program: PathBuf,
        /// Start here instead of at the program's entry point.
        #[clap(long, value_parser = parse_address)]
        start: Option<u16>,
        /// Don't look for a BASIC SYS launcher to find the entry point.
        #[clap(long)]
        no_offset_correction: bool,
        /// Stop at this address.  May be repeated.
        #[clap(long = "break", value_parser = parse_address)]
        breakpoints: Vec<u16>,
        /// Simulate a C64 using basic.bin, kernal.bin and chargen.bin from
        /// this directory.
        #[clap(long)]
        c64_roms: Option<PathBuf>,
        /// Stop after this many instructions.
        #[clap(long)]
        max_instructions: Option<u64>,
    },
    /// Connects to a running emulator's binary monitor.
    Monitor {
        /// Monitor host.
        #[clap(long, default_value = "127.0.0.1")]
        host: String,
        /// Monitor port.
        #[clap(long, default_value_t = 6502)]
        port: u16,
        /// Reset the emulator and autostart this program.
        #[clap(long)]
        autostart: Option<PathBuf>,
        /// Set a breakpoint at this address.  May be repeated.
        #[clap(long = "break", value_parser = parse_address)]
        breakpoints: Vec<u16>,
    },
}

//===========================================================================//

#[tokio::main]
async fn main() -> c64db::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Run {
            program,
            start,
            no_offset_correction,
            breakpoints,
            c64_roms,
            max_instructions,
        } => {
            let mut config = LocalConfig::default();
            if let Some(dir) = c64_roms {
                config = config.with_machine(Machine::C64(RomSet::load_dir(&dir)?));
            }
            if let Some(limit) = max_instructions {
                config = config
                    .with_slice_time(Duration::MAX)
                    .with_slice_max_steps(limit);
            }
            let mut engine = LocalEngine::new(config);
            engine.init();
            let entry = engine.load_program(&program, !no_offset_correction, start)?;
            println!("{}, entry point ${entry:04x}", engine.description());
            engine.set_breakpoints(to_breakpoints(&breakpoints));
            engine.start();
            loop {
                match engine.poll_event() {
                    Some(event) => {
                        println!("{event}");
                        if let DebugEvent::Stopped(_) = event {
                            break;
                        }
                    }
                    // With an instruction limit, one slice is the whole run.
                    None if max_instructions.is_some() => engine.stop(),
                    None if !engine.is_running() => break,
                    None => {}
                }
            }
            println!("{}", engine.cpu_state());
        }
        Command::Monitor { host, port, autostart, breakpoints } => {
            let config = RemoteConfig::new(MonitorConfig::new(host, port));
            let mut backend = Backend::remote(config);
            backend.set_breakpoints(to_breakpoints(&breakpoints)).await?;
            backend.init().await?;
            if let Some(program) = autostart {
                backend.load_program(&program, true, None).await?;
            }
            println!("{}", backend.cpu_state().await?);
            if let Backend::Remote(engine) = &backend {
                if let Some(client) = engine.client() {
                    for checkpoint in client.checkpoint_list().await? {
                        println!(
                            "checkpoint {}: ${:04x}-${:04x} hits={}{}",
                            checkpoint.id,
                            checkpoint.start,
                            checkpoint.end,
                            checkpoint.hit_count,
                            if checkpoint.temporary { " (temporary)" } else { "" }
                        );
                    }
                    client.exit().await?;
                }
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "c64db=debug" } else { "c64db=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn to_breakpoints(addresses: &[u16]) -> Breakpoints {
    addresses.iter().map(|&addr| Breakpoint::new(addr)).collect()
}

/// Parses `$c000`, `0xc000` or `49152`.
fn parse_address(text: &str) -> Result<u16, String> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix('$') {
        (hex, 16)
    } else if let Some(hex) =
        text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else {
        (text, 10)
    };
    u16::from_str_radix(digits, radix)
        .map_err(|error| format!("invalid address {text:?}: {error}"))
}

//===========================================================================//


//===========================================================================//
