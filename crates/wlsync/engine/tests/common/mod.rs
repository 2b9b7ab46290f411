//! In-process collaborators for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wlsync_engine::{
    AccessListGateway, EventSource, GatewayResult, IdentityResolver, Notifier, ReconciliationEngine,
    ResolutionError, ResolvedIdentity, TransportError,
};
use wlsync_store::{BindingStore, InMemoryBindingStore, StoreError, StoreResult};
use wlsync_types::{Account, Binding, ChatEvent, DisplayName, IdentityKey};

pub fn name(s: &str) -> DisplayName {
    DisplayName::parse(s).unwrap()
}

pub fn key(n: u128) -> IdentityKey {
    IdentityKey::from_bytes(n.to_be_bytes())
}

/// Resolves a fixed table of names, case-insensitively.
#[derive(Default)]
pub struct FakeResolver {
    profiles: HashMap<String, ResolvedIdentity>,
    pub calls: AtomicUsize,
}

impl FakeResolver {
    pub fn with(profiles: &[(&str, u128)]) -> Self {
        let profiles = profiles
            .iter()
            .map(|(n, k)| {
                (
                    n.to_ascii_lowercase(),
                    ResolvedIdentity {
                        display_name: name(n),
                        identity: key(*k),
                    },
                )
            })
            .collect();
        Self {
            profiles,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityResolver for FakeResolver {
    async fn resolve(
        &self,
        name: &DisplayName,
        _as_of: DateTime<Utc>,
    ) -> Result<ResolvedIdentity, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .get(&name.as_str().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ResolutionError::Unknown(name.clone()))
    }
}

/// Whitelist kept in memory, answering like a vanilla server console.
/// With `silent` set every command succeeds with empty output.
#[derive(Default)]
pub struct RecordingGateway {
    pub log: Mutex<Vec<String>>,
    pub whitelist: Mutex<BTreeSet<String>>,
    pub silent: AtomicBool,
}

impl RecordingGateway {
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.whitelist.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessListGateway for RecordingGateway {
    async fn add(&self, name: &DisplayName) -> GatewayResult<String> {
        self.log.lock().unwrap().push(format!("add {name}"));
        let added = self.whitelist.lock().unwrap().insert(name.to_string());
        if self.silent.load(Ordering::SeqCst) {
            return Ok(String::new());
        }
        Ok(if added {
            format!("§eAdded {name} to the whitelist")
        } else {
            "Player is already whitelisted".to_string()
        })
    }

    async fn remove(&self, name: &DisplayName, _identity: &IdentityKey) -> GatewayResult<String> {
        self.log.lock().unwrap().push(format!("remove {name}"));
        let removed = self.whitelist.lock().unwrap().remove(name.as_str());
        if self.silent.load(Ordering::SeqCst) {
            return Ok(String::new());
        }
        Ok(if removed {
            format!("Removed {name} from the whitelist")
        } else {
            "Player is not whitelisted".to_string()
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// In-memory store whose reads or writes can be switched to failing.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryBindingStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    fn read_guard(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("database is down".to_string()));
        }
        Ok(())
    }

    fn write_guard(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Query("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BindingStore for FlakyStore {
    async fn find_by_identity(&self, identity: &IdentityKey) -> StoreResult<Option<Account>> {
        self.read_guard()?;
        self.inner.find_by_identity(identity).await
    }

    async fn find_by_account(&self, account: Account) -> StoreResult<Option<Binding>> {
        self.read_guard()?;
        self.inner.find_by_account(account).await
    }

    async fn insert(
        &self,
        account: Account,
        display_name: &DisplayName,
        identity: &IdentityKey,
    ) -> StoreResult<Binding> {
        self.write_guard()?;
        self.inner.insert(account, display_name, identity).await
    }

    async fn delete(&self, identity: &IdentityKey) -> StoreResult<bool> {
        self.write_guard()?;
        self.inner.delete(identity).await
    }

    async fn list(&self) -> StoreResult<Vec<Binding>> {
        self.read_guard()?;
        self.inner.list().await
    }
}

/// Replays a fixed list of events, then fails like a dead connection.
pub struct ScriptedSource {
    events: Mutex<VecDeque<ChatEvent>>,
}

impl ScriptedSource {
    pub fn new(events: Vec<ChatEvent>) -> Self {
        Self {
            events: Mutex::new(events.into()),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&self) -> Result<ChatEvent, TransportError> {
        let next = self.events.lock().unwrap().pop_front();
        next.ok_or_else(|| TransportError::Reconnect("script exhausted".to_string()))
    }
}

/// Engine wired to fakes, with handles kept for assertions.
pub struct Harness {
    pub resolver: Arc<FakeResolver>,
    pub store: Arc<FlakyStore>,
    pub gateway: Arc<RecordingGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(profiles: &[(&str, u128)]) -> Self {
        Self {
            resolver: Arc::new(FakeResolver::with(profiles)),
            store: Arc::new(FlakyStore::default()),
            gateway: Arc::new(RecordingGateway::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(
            self.resolver.clone(),
            self.store.clone(),
            self.gateway.clone(),
            self.notifier.clone(),
        )
    }

    /// Display names currently bound in the store
    pub async fn bound_names(&self) -> BTreeSet<String> {
        self.store
            .inner
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.display_name.to_string())
            .collect()
    }
}
