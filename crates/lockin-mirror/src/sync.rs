// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped mirror connection and whole-file push.

use std::path::Path;

use tracing::{info, warn};

use lockin_config::model::MirrorConfig;
use lockin_core::{LockinError, MirrorStatus, RemoteShare, ShareConnector, SyncResult};

use crate::mounted::MountedShareConnector;

/// Owns at most one connection to the mirror target.
///
/// A failed connection leaves mirroring inactive until the next
/// [`connect_if_enabled`](Self::connect_if_enabled); there is no retry.
pub struct MirrorSync {
    enabled: bool,
    remote_file_name: String,
    connector: Box<dyn ShareConnector>,
    share: Option<Box<dyn RemoteShare>>,
}

impl MirrorSync {
    /// Build a mirror that uses `connector` to reach the share.
    pub fn new(config: &MirrorConfig, connector: Box<dyn ShareConnector>) -> Self {
        Self {
            enabled: config.enabled(),
            remote_file_name: config.remote_file_name.clone(),
            connector,
            share: None,
        }
    }

    /// Build a mirror backed by the OS-mounted share described in `config`.
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config, Box::new(MountedShareConnector::new(config)))
    }

    /// Connect when mirroring is configured and not already connected.
    ///
    /// Returns whether a connection is held afterwards. Failures are logged,
    /// never returned.
    pub async fn connect_if_enabled(&mut self) -> bool {
        if !self.enabled || self.share.is_some() {
            return self.is_active();
        }

        let target = self.connector.describe();
        match self.connector.connect().await {
            Ok(share) => {
                info!(share = %target, "mirror connected");
                self.share = Some(share);
            }
            Err(e) => {
                warn!(share = %target, error = %e, "mirror connection failed, mirroring inactive for this session");
            }
        }
        self.is_active()
    }

    /// Copy the whole file at `source` to the share, overwriting the remote copy.
    ///
    /// Reports `enabled: false` when no connection is held.
    pub async fn push(&self, source: &Path) -> SyncResult {
        let Some(share) = self.share.as_ref() else {
            return SyncResult::disabled();
        };

        let contents = match tokio::fs::read(source).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = LockinError::sync(format!("cannot read {}", source.display()), e);
                warn!(error = %err, "mirror push failed");
                return SyncResult::failed(err);
            }
        };

        match share.put(&self.remote_file_name, &contents).await {
            Ok(written) => {
                info!(file = %self.remote_file_name, bytes = written, "mirror push complete");
                SyncResult::synced()
            }
            Err(err) => {
                warn!(error = %err, "mirror push failed");
                SyncResult::failed(err)
            }
        }
    }

    /// Drop the connection. Safe when none is held.
    pub async fn close(&mut self) {
        if let Some(mut share) = self.share.take() {
            share.close().await;
            info!(share = %self.connector.describe(), "mirror disconnected");
        }
    }

    pub fn is_active(&self) -> bool {
        self.share.is_some()
    }

    pub fn status(&self) -> MirrorStatus {
        MirrorStatus {
            configured: self.enabled,
            active: self.is_active(),
        }
    }
}

impl std::fmt::Debug for MirrorSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorSync")
            .field("enabled", &self.enabled)
            .field("target", &self.connector.describe())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    /// Minimal in-memory share; the full mock lives in lockin-test-utils.
    #[derive(Default, Clone)]
    struct Recorder {
        puts: Arc<Mutex<Vec<(String, usize)>>>,
        refuse: bool,
    }

    struct RecorderShare(Recorder);

    #[async_trait]
    impl ShareConnector for Recorder {
        fn describe(&self) -> String {
            "//recorder/share".into()
        }

        async fn connect(&self) -> Result<Box<dyn RemoteShare>, LockinError> {
            if self.refuse {
                return Err(LockinError::SyncFailure {
                    message: "refused".into(),
                    source: None,
                });
            }
            Ok(Box::new(RecorderShare(self.clone())))
        }
    }

    #[async_trait]
    impl RemoteShare for RecorderShare {
        async fn put(&self, name: &str, contents: &[u8]) -> Result<u64, LockinError> {
            self.0.puts.lock().unwrap().push((name.to_string(), contents.len()));
            Ok(contents.len() as u64)
        }

        async fn close(&mut self) {}
    }

    fn enabled_config() -> MirrorConfig {
        MirrorConfig {
            enabled: true,
            remote_file_name: "copy.db".into(),
            ..MirrorConfig::default()
        }
    }

    #[tokio::test]
    async fn disabled_mirror_never_connects() {
        let recorder = Recorder::default();
        let mut mirror = MirrorSync::new(&MirrorConfig::default(), Box::new(recorder.clone()));
        assert!(!mirror.connect_if_enabled().await);

        let result = mirror.push(Path::new("/does/not/matter")).await;
        assert!(!result.enabled);
        assert!(result.is_ok());
        assert!(recorder.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_sends_whole_file_under_remote_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("local.db");
        std::fs::write(&source, vec![7u8; 4096]).unwrap();

        let recorder = Recorder::default();
        let mut mirror = MirrorSync::new(&enabled_config(), Box::new(recorder.clone()));
        assert!(mirror.connect_if_enabled().await);

        let result = mirror.push(&source).await;
        assert!(result.enabled && result.is_ok());
        assert_eq!(
            recorder.puts.lock().unwrap().as_slice(),
            &[("copy.db".to_string(), 4096)]
        );
    }

    #[tokio::test]
    async fn refused_connection_leaves_mirror_inactive() {
        let recorder = Recorder {
            refuse: true,
            ..Recorder::default()
        };
        let mut mirror = MirrorSync::new(&enabled_config(), Box::new(recorder));
        assert!(!mirror.connect_if_enabled().await);
        assert_eq!(
            mirror.status(),
            MirrorStatus {
                configured: true,
                active: false
            }
        );
        assert!(!mirror.push(Path::new("x")).await.enabled);
    }

    #[tokio::test]
    async fn unreadable_source_is_reported() {
        let mut mirror = MirrorSync::new(&enabled_config(), Box::new(Recorder::default()));
        mirror.connect_if_enabled().await;
        let result = mirror.push(Path::new("/nonexistent/lockin.db")).await;
        assert!(result.enabled);
        assert!(matches!(result.failure, Some(LockinError::SyncFailure { .. })));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut mirror = MirrorSync::new(&enabled_config(), Box::new(Recorder::default()));
        mirror.connect_if_enabled().await;
        assert!(mirror.is_active());
        mirror.close().await;
        mirror.close().await;
        assert!(!mirror.is_active());
    }
}
