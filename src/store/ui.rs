//! Session-scoped UI flags.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::storage::{MemoryStorage, StateStorage};

/// Name of the durable record holding the persisted subset.
pub const STORAGE_NAME: &str = "ui-storage";

/// Store name attached to every logged action.
const STORE_NAME: &str = "UIStore";

/// Transient UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub sidebar_open: bool,
    pub active_modal: Option<String>,
    pub is_loading: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            active_modal: None,
            is_loading: false,
        }
    }
}

/// The part of [`UiState`] written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedUiState {
    #[serde(default = "default_sidebar_open")]
    pub sidebar_open: bool,
}

fn default_sidebar_open() -> bool {
    UiState::default().sidebar_open
}

impl PersistedUiState {
    /// Overlay the persisted fields onto `state`.
    pub fn apply(self, state: &mut UiState) {
        state.sidebar_open = self.sidebar_open;
    }
}

/// Map full state to its persisted subset.
#[must_use]
pub fn partialize(state: &UiState) -> PersistedUiState {
    PersistedUiState {
        sidebar_open: state.sidebar_open,
    }
}

struct UiStoreInner {
    state: watch::Sender<UiState>,
    storage: Arc<dyn StateStorage>,
}

impl fmt::Debug for UiStoreInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiStoreInner")
            .field("state", &*self.state.borrow())
            .field("storage", &self.storage)
            .finish()
    }
}

/// UI state container.
///
/// Built once per session and shared by cloning (clones are handles to the
/// same state). Every mutation replaces a single field; when the persisted
/// subset changes it is written to storage under [`STORAGE_NAME`].
#[derive(Debug)]
pub struct UiStore {
    inner: Arc<UiStoreInner>,
}

impl Clone for UiStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl UiStore {
    /// Create a store, restoring persisted fields from `storage`.
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let mut state = UiState::default();
        if let Some(persisted) = read_persisted(storage.as_ref()) {
            persisted.apply(&mut state);
        }
        debug!(name: "ui_store.hydrated", store = STORE_NAME, sidebar_open = state.sidebar_open, "UI store hydrated");

        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(UiStoreInner {
                state: sender,
                storage,
            }),
        }
    }

    /// Store backed by fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.inner.state.borrow().clone()
    }

    pub fn sidebar_open(&self) -> bool {
        self.inner.state.borrow().sidebar_open
    }

    pub fn active_modal(&self) -> Option<String> {
        self.inner.state.borrow().active_modal.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.inner.state.subscribe()
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.update("setSidebarOpen", |state| state.sidebar_open = open);
    }

    pub fn toggle_sidebar(&self) {
        self.update("toggleSidebar", |state| state.sidebar_open = !state.sidebar_open);
    }

    pub fn open_modal(&self, modal_id: impl Into<String>) {
        let modal_id = modal_id.into();
        self.update("openModal", |state| state.active_modal = Some(modal_id));
    }

    pub fn close_modal(&self) {
        self.update("closeModal", |state| state.active_modal = None);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update("setLoading", |state| state.is_loading = loading);
    }

    /// Re-read the persisted record and overlay it onto the current state.
    pub fn rehydrate(&self) {
        if let Some(persisted) = read_persisted(self.inner.storage.as_ref()) {
            self.update("rehydrate", |state| persisted.apply(state));
        }
    }

    /// Remove the persisted record. Current state is left as is; the next
    /// change to a persisted field writes a fresh record.
    pub fn clear_persisted(&self) {
        match self.inner.storage.remove_item(STORAGE_NAME) {
            Ok(()) => debug!(name: "ui_store.cleared", store = STORE_NAME, "Persisted UI state cleared"),
            Err(err) => {
                warn!(name: "ui_store.clear.failed", store = STORE_NAME, error = %err, "Could not clear persisted UI state");
            }
        }
    }

    fn update(&self, action: &'static str, mutate: impl FnOnce(&mut UiState)) {
        let mut persist = false;
        let changed = self.inner.state.send_if_modified(|state| {
            let before = state.clone();
            mutate(state);
            persist = partialize(state) != partialize(&before);
            *state != before
        });
        debug!(name: "ui_store.action", store = STORE_NAME, action, changed, "UI store action");

        // Storage is written outside the channel lock, from the latest state.
        if persist {
            let persisted = partialize(&self.inner.state.borrow());
            write_persisted(self.inner.storage.as_ref(), persisted);
        }
    }
}

impl Default for UiStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn read_persisted(storage: &dyn StateStorage) -> Option<PersistedUiState> {
    let text = match storage.get_item(STORAGE_NAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            warn!(name: "ui_store.read.failed", store = STORE_NAME, error = %err, "Could not read persisted UI state");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(persisted) => Some(persisted),
        Err(err) => {
            warn!(name: "ui_store.parse.failed", store = STORE_NAME, error = %err, "Ignoring malformed persisted UI state");
            None
        }
    }
}

fn write_persisted(storage: &dyn StateStorage, persisted: PersistedUiState) {
    let result = serde_json::to_string(&persisted)
        .map_err(|err| err.to_string())
        .and_then(|json| {
            storage
                .set_item(STORAGE_NAME, &json)
                .map_err(|err| err.to_string())
        });
    if let Err(error) = result {
        warn!(name: "ui_store.write.failed", store = STORE_NAME, error = %error, "Could not persist UI state");
    }
}
