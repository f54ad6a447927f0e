// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock share connector for deterministic mirror tests.
//!
//! `MockShare` implements both `ShareConnector` and the connection it hands
//! out. Clones share state, so a test can keep a handle after passing one
//! into the mirror and assert on what was pushed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lockin_core::{LockinError, RemoteShare, ShareConnector};

#[derive(Default)]
struct State {
    files: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    connects: AtomicUsize,
    closes: AtomicUsize,
    refuse_connect: AtomicBool,
    fail_puts: AtomicBool,
}

/// An in-memory share.
#[derive(Clone, Default)]
pub struct MockShare {
    state: Arc<State>,
}

impl MockShare {
    /// Create a share that accepts connections and writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect()` calls fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// Make subsequent `put()` calls fail.
    pub fn fail_puts(&self, fail: bool) {
        self.state.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Contents of `name`, if it was ever pushed.
    pub async fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.files.lock().await.get(name).cloned()
    }

    /// Number of successful pushes.
    pub fn put_count(&self) -> usize {
        self.state.puts.load(Ordering::SeqCst)
    }

    /// Number of successful connections.
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Number of times a connection was closed.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShareConnector for MockShare {
    fn describe(&self) -> String {
        "//mock/share".to_string()
    }

    async fn connect(&self) -> Result<Box<dyn RemoteShare>, LockinError> {
        if self.state.refuse_connect.load(Ordering::SeqCst) {
            return Err(LockinError::SyncFailure {
                message: "mock share refused connection".into(),
                source: None,
            });
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl RemoteShare for MockShare {
    async fn put(&self, name: &str, contents: &[u8]) -> Result<u64, LockinError> {
        if self.state.fail_puts.load(Ordering::SeqCst) {
            return Err(LockinError::SyncFailure {
                message: "mock share rejected write".into(),
                source: None,
            });
        }
        self.state
            .files
            .lock()
            .await
            .insert(name.to_string(), contents.to_vec());
        self.state.puts.fetch_add(1, Ordering::SeqCst);
        Ok(contents.len() as u64)
    }

    async fn close(&mut self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
