//! The ethersrv binary: command line, logging, lockfile, daemonization and
//! the runtime around the serve loop.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ethersrv::config::{self, Overrides, Settings};
use ethersrv::engine::Engine;
use ethersrv::fs::{drive_letter, DriveTable};
use ethersrv::link::{self, PacketSocket};
use ethersrv::lock::LockFile;
use ethersrv::server;

/// EtherDFS file server: serves host directories as DOS drives over raw
/// Ethernet frames.
#[derive(Debug, Parser)]
#[command(name = "ethersrv", version)]
struct Cli {
    /// Keep in foreground (do not daemonize)
    #[arg(short = 'f', long)]
    foreground: bool,

    /// Verbose / debug logging to stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Optional TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Network interface to listen on
    interface: Option<String>,

    /// Host directories served as drives C: and up
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = cli.config.as_deref().map(config::load).transpose()?.unwrap_or_default();
    let settings = Settings::merge(
        Overrides {
            interface: cli.interface,
            roots: cli.roots,
            foreground: cli.foreground,
            verbose: cli.verbose,
        },
        file,
    )?;

    let filter = if settings.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let mut drives = DriveTable::new();
    for (i, root) in settings.roots.iter().enumerate() {
        let index = ethersrv::fs::FIRST_DRIVE + i as u8;
        drives
            .map(index, root)
            .map_err(|err| format!("cannot map {}: {err}", root.display()))?;
    }

    let (fd, mac) = link::open_raw(&settings.interface).map_err(|err| {
        format!("cannot open raw socket on '{}': {err} (are you root?)", settings.interface)
    })?;

    info!(interface = %settings.interface, mac = %format_mac(&mac), "listening");
    for (index, drive) in drives.iter() {
        info!("drive {}: mapped to {}", drive_letter(index), drive.root.display());
        if !drive.is_fat {
            warn!(
                "path '{}' is not FAT; DOS attributes are synthesized",
                drive.root.display()
            );
        }
    }

    let _lock = LockFile::acquire(&settings.lockfile)
        .map_err(|err| format!("cannot acquire lock {}: {err}", settings.lockfile.display()))?;

    if !settings.foreground {
        daemonize()?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async {
        let mut socket = PacketSocket::new(fd, mac)?;
        let mut engine = Engine::new(drives, mac);
        server::serve(&mut socket, &mut engine).await
    })?;
    Ok(())
}

/// Detaches from the controlling terminal: the parent returns to the shell,
/// the child keeps the open socket and lockfile.
fn daemonize() -> io::Result<()> {
    unsafe { libc::signal(libc::SIGHUP, libc::SIG_IGN) };
    match unsafe { libc::fork() } {
        0 => Ok(()),
        pid if pid > 0 => std::process::exit(0),
        _ => Err(io::Error::last_os_error()),
    }
}

fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(":")
}
