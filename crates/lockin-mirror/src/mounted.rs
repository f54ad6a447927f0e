// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Share connector for an SMB/CIFS share reached through a local mount.
//!
//! The server is reached over TCP first, so an unreachable host fails fast
//! instead of blocking on a stale mount. With `auto_mount`, a share that is
//! not mounted yet is mounted with `mount -t cifs` using the configured
//! account and unmounted again when the connection closes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{debug, info, warn};

use lockin_config::model::MirrorConfig;
use lockin_core::{LockinError, RemoteShare, ShareConnector};

/// Connects to `//host:port/share` through its local mount point.
#[derive(Debug, Clone)]
pub struct MountedShareConnector {
    address: String,
    target: String,
    mount: MountSpec,
    auto_mount: bool,
    timeout: Duration,
}

impl MountedShareConnector {
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            address: config.address(),
            target: config.target(),
            mount: MountSpec::from_config(config),
            auto_mount: config.auto_mount,
            timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }

    async fn check_reachable(&self) -> Result<(), LockinError> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(LockinError::sync(
                format!("cannot reach {}", self.address),
                e,
            )),
            Err(_) => Err(LockinError::SyncFailure {
                message: format!(
                    "timed out after {}s connecting to {}",
                    self.timeout.as_secs(),
                    self.address
                ),
                source: None,
            }),
        }
    }

    /// Mount the share unless something is mounted already.
    ///
    /// Returns true when this call did the mounting.
    async fn ensure_mounted(&self) -> Result<bool, LockinError> {
        let path = &self.mount.mount_path;
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            LockinError::sync(format!("cannot create mount point {}", path.display()), e)
        })?;
        let mounted = is_mount_point(path).await.map_err(|e| {
            LockinError::sync(format!("cannot inspect mount point {}", path.display()), e)
        })?;
        if mounted {
            debug!(mount = %path.display(), "share already mounted");
            return Ok(false);
        }
        if !cfg!(target_os = "linux") {
            return Err(LockinError::SyncFailure {
                message: format!(
                    "mount {} at {} first, or set mirror.auto_mount = false",
                    self.mount.unc,
                    path.display()
                ),
                source: None,
            });
        }

        run_helper(self.mount.mount_command(), self.timeout, "mount").await?;
        info!(
            share = %self.mount.unc,
            user = %self.mount.user,
            mount = %path.display(),
            "share mounted"
        );
        Ok(true)
    }
}

#[async_trait]
impl ShareConnector for MountedShareConnector {
    fn describe(&self) -> String {
        self.target.clone()
    }

    async fn connect(&self) -> Result<Box<dyn RemoteShare>, LockinError> {
        self.check_reachable().await?;
        let mounted_here = if self.auto_mount {
            self.ensure_mounted().await?
        } else {
            false
        };

        let root = &self.mount.mount_path;
        let meta = tokio::fs::metadata(root).await.map_err(|e| {
            LockinError::sync(
                format!("share mount {} is not available", root.display()),
                e,
            )
        })?;
        if !meta.is_dir() {
            return Err(LockinError::SyncFailure {
                message: format!("share mount {} is not a directory", root.display()),
                source: None,
            });
        }

        info!(share = %self.target, mount = %root.display(), "share connected");
        let mut share = MountedShare::new(root);
        if mounted_here {
            share.unmount = Some((self.mount.clone(), self.timeout));
        }
        Ok(Box::new(share))
    }
}

/// Everything the mount helper needs. Debug output omits the password.
#[derive(Clone)]
pub struct MountSpec {
    unc: String,
    mount_path: PathBuf,
    port: u16,
    user: String,
    password: Option<String>,
    mount_program: String,
    umount_program: String,
}

impl std::fmt::Debug for MountSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountSpec")
            .field("unc", &self.unc)
            .field("mount_path", &self.mount_path)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl MountSpec {
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self {
            unc: config.unc(),
            mount_path: config.resolved_mount_path(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
            mount_program: "mount".to_string(),
            umount_program: "umount".to_string(),
        }
    }

    /// `-o` options for mount.cifs. An empty user mounts as guest.
    fn options(&self) -> String {
        let account = if self.user.is_empty() {
            "guest".to_string()
        } else {
            format!("username={}", self.user)
        };
        format!("port={},{account}", self.port)
    }

    /// `mount -t cifs //host/share <mount_path> -o ...`.
    ///
    /// mount.cifs reads the password from `PASSWD`, keeping it out of the
    /// process list.
    pub fn mount_command(&self) -> Command {
        let mut cmd = Command::new(&self.mount_program);
        cmd.args(["-t", "cifs"])
            .arg(&self.unc)
            .arg(&self.mount_path)
            .arg("-o")
            .arg(self.options());
        if let Some(password) = &self.password {
            cmd.env("PASSWD", password);
        }
        cmd
    }

    pub fn umount_command(&self) -> Command {
        let mut cmd = Command::new(&self.umount_program);
        cmd.arg(&self.mount_path);
        cmd
    }
}

async fn run_helper(mut cmd: Command, timeout: Duration, what: &str) -> Result<(), LockinError> {
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(LockinError::sync(format!("cannot run {what} helper"), e)),
        Err(_) => {
            return Err(LockinError::SyncFailure {
                message: format!("{what} timed out after {}s", timeout.as_secs()),
                source: None,
            });
        }
    };
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(LockinError::SyncFailure {
        message: format!("{what} failed ({}): {}", output.status, stderr.trim()),
        source: None,
    })
}

/// A directory is a mount point when it sits on another device than its
/// parent, or is the filesystem root.
#[cfg(unix)]
async fn is_mount_point(path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let own = tokio::fs::metadata(path).await?;
    let parent = tokio::fs::metadata(path.join("..")).await?;
    Ok(own.dev() != parent.dev() || own.ino() == parent.ino())
}

#[cfg(not(unix))]
async fn is_mount_point(path: &Path) -> std::io::Result<bool> {
    Ok(tokio::fs::metadata(path).await?.is_dir())
}

/// An open share rooted at a local directory.
#[derive(Debug)]
pub struct MountedShare {
    root: PathBuf,
    closed: AtomicBool,
    unmount: Option<(MountSpec, Duration)>,
}

impl MountedShare {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            closed: AtomicBool::new(false),
            unmount: None,
        }
    }
}

#[async_trait]
impl RemoteShare for MountedShare {
    async fn put(&self, name: &str, contents: &[u8]) -> Result<u64, LockinError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LockinError::SyncFailure {
                message: "share connection is closed".into(),
                source: None,
            });
        }

        let dest = self.root.join(name);
        let staging = self.root.join(format!(".{name}.partial"));
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| LockinError::sync(format!("write {} failed", staging.display()), e))?;
        if let Err(e) = tokio::fs::rename(&staging, &dest).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(LockinError::sync(format!("replace {} failed", dest.display()), e));
        }

        debug!(dest = %dest.display(), bytes = contents.len(), "share file replaced");
        Ok(contents.len() as u64)
    }

    async fn close(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some((spec, timeout)) = self.unmount.take() {
            match run_helper(spec.umount_command(), timeout, "unmount").await {
                Ok(()) => info!(mount = %spec.mount_path.display(), "share unmounted"),
                Err(e) => warn!(mount = %spec.mount_path.display(), error = %e, "share unmount failed"),
            }
        }
    }
}
