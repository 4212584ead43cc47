//! Server configuration.
//!
//! Everything can be given on the command line; a TOML file can carry the
//! same settings for unattended installs. Command-line values win over the
//! file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Highest number of exported roots: drives C: through Z:.
pub const MAX_ROOTS: usize = 24;

/// Lockfile used when neither the CLI nor the file names one.
pub const DEFAULT_LOCKFILE: &str = "/var/run/ethersrv.lock";

/// Contents of the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub interface: Option<String>,
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub foreground: bool,
    #[serde(default)]
    pub verbose: bool,
    pub lockfile: Option<PathBuf>,
}

/// Settings taken from the command line, overriding the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub interface: Option<String>,
    pub roots: Vec<PathBuf>,
    pub foreground: bool,
    pub verbose: bool,
}

/// The merged, validated server settings.
#[derive(Debug)]
pub struct Settings {
    pub interface: String,
    /// Host directories mapped to drive letters starting at C:.
    pub roots: Vec<PathBuf>,
    pub foreground: bool,
    pub verbose: bool,
    pub lockfile: PathBuf,
}

impl Settings {
    /// Merges command line over file contents and validates the result.
    pub fn merge(cli: Overrides, file: FileConfig) -> Result<Settings, String> {
        let interface = cli
            .interface
            .or(file.interface)
            .ok_or("no network interface given (argument or config file)")?;
        let roots = if cli.roots.is_empty() { file.roots } else { cli.roots };
        if roots.is_empty() {
            return Err("no drive root directories given".into());
        }
        if roots.len() > MAX_ROOTS {
            return Err(format!("at most {MAX_ROOTS} drive roots are supported"));
        }
        Ok(Settings {
            interface,
            roots,
            foreground: cli.foreground || file.foreground,
            verbose: cli.verbose || file.verbose,
            lockfile: file.lockfile.unwrap_or_else(|| PathBuf::from(DEFAULT_LOCKFILE)),
        })
    }
}

/// Errors surfaced while reading the configuration file.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "cannot read config file: {err}"),
            Error::Parse(err) => write!(f, "cannot parse config file: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// Loads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<FileConfig, Error> {
    let text = std::fs::read_to_string(path).map_err(Error::Io)?;
    toml::from_str(&text).map_err(Error::Parse)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{FileConfig, Overrides, Settings, DEFAULT_LOCKFILE};

    #[test]
    fn test_file_config_parses() {
        let file: FileConfig = toml::from_str(
            r#"
            interface = "eth0"
            roots = ["/srv/dos/c", "/srv/dos/d"]
            verbose = true
            lockfile = "/tmp/ethersrv.lock"
            "#,
        )
        .unwrap();
        assert_eq!(file.interface.as_deref(), Some("eth0"));
        assert_eq!(file.roots.len(), 2);
        assert!(file.verbose);
        assert!(!file.foreground);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("iface = \"eth0\"").is_err());
    }

    #[test]
    fn test_cli_wins_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            interface = "eth0"
            roots = ["/file"]
            "#,
        )
        .unwrap();
        let cli = Overrides {
            interface: Some("eth1".into()),
            roots: vec![PathBuf::from("/cli")],
            ..Default::default()
        };
        let settings = Settings::merge(cli, file).unwrap();
        assert_eq!(settings.interface, "eth1");
        assert_eq!(settings.roots, [PathBuf::from("/cli")]);
        assert_eq!(settings.lockfile, PathBuf::from(DEFAULT_LOCKFILE));
    }

    #[test]
    fn test_missing_interface_is_an_error() {
        assert!(Settings::merge(Overrides::default(), FileConfig::default()).is_err());
    }

    #[test]
    fn test_too_many_roots_are_rejected() {
        let cli = Overrides {
            interface: Some("eth0".into()),
            roots: (0..25).map(|i| PathBuf::from(format!("/r{i}"))).collect(),
            ..Default::default()
        };
        assert!(Settings::merge(cli, FileConfig::default()).is_err());
    }
}
