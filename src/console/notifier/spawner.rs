//! Launches a new service instance.
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[cfg(test)]
use mockall::automock;
use torrust_announce_proxy_configuration::Configuration;

use super::Error;
use crate::core::port_state::Port;

/// Name of the service executable.
pub const SERVICE_BINARY_NAME: &str = "torrust-announce-proxy";

#[cfg_attr(test, automock)]
pub trait InstanceSpawner: Sync + Send {
    /// Launches a service instance seeded with `port` and returns its pid
    /// without waiting for it.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the process can not be created.
    fn spawn(&self, port: Port) -> Result<u32, Error>;
}

/// Launches the service detached from the caller: in its own process group
/// and with no standard streams, so it outlives the notifier.
#[derive(Debug, Clone)]
pub struct DetachedSpawner {
    program: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl DetachedSpawner {
    #[must_use]
    pub fn new(program: PathBuf) -> Self {
        Self { program, envs: vec![] }
    }

    /// The configured `serviceBinary`, or the service executable next to
    /// the running one.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        let program = config
            .notifier
            .service_binary
            .as_ref()
            .map_or_else(default_program, |path| path.clone().into_std_path_buf());

        Self::new(program)
    }

    /// Adds an environment variable for the new instance.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl InstanceSpawner for DetachedSpawner {
    fn spawn(&self, port: Port) -> Result<u32, Error> {
        let mut command = Command::new(&self.program);

        command
            .arg(port.to_string())
            .envs(self.envs.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        detach(&mut command);

        let child = command.spawn().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        Ok(child.id())
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt as _;

    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt as _;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}

fn default_program() -> PathBuf {
    let name = format!("{SERVICE_BINARY_NAME}{}", std::env::consts::EXE_SUFFIX);

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}
