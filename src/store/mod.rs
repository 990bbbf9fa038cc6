//! Client-side UI state.
//!
//! - [`UiStore`]: sidebar, modal and loading flags with setters
//! - [`partialize`]: the persistence boundary (full state to stored subset)
//! - [`StateStorage`]: where the stored subset lives ([`MemoryStorage`], [`FileStorage`])
//!
//! # Example
//!
//! ```rust
//! use frontend_kit::store::UiStore;
//!
//! let store = UiStore::in_memory();
//! store.toggle_sidebar();
//! store.open_modal("settings");
//!
//! assert!(!store.sidebar_open());
//! assert_eq!(store.active_modal().as_deref(), Some("settings"));
//! ```

mod storage;
mod ui;

pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError};
pub use ui::{PersistedUiState, STORAGE_NAME, UiState, UiStore, partialize};
