#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{Preferences, PreferencesRepository, StorageError};
pub use sqlite::{SqliteInitError, SqliteStore};
