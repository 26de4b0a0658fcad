//! User-maintained shopping list, persisted as a JSON file next to the
//! flyer artifact.
//!
//! The front end owns the list's content: updates arrive as a wholesale
//! replacement of the entire list, and deletions address a single entry by
//! its `id`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::record::StoreKey;

/// Name of the shopping-list file inside the data directory.
pub const SHOPPING_LIST_FILE: &str = "shopping_list.json";

#[derive(Debug, Error)]
pub enum ShoppingListError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize shopping list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One item the user put on their list, copied from a flyer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub id: Uuid,
    pub name: String,
    pub store: StoreKey,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub original_price: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

/// File-backed shopping list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShoppingList(pub Vec<ShoppingListEntry>);

impl ShoppingList {
    /// Loads the list from `data_dir`; a missing or corrupt file yields an
    /// empty list.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SHOPPING_LIST_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persists the list to `<data_dir>/shopping_list.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ShoppingListError`] if the data directory or file cannot be
    /// written.
    pub fn save(&self, data_dir: &Path) -> Result<(), ShoppingListError> {
        std::fs::create_dir_all(data_dir).map_err(|source| ShoppingListError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let path = data_dir.join(SHOPPING_LIST_FILE);
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| ShoppingListError::Io { path, source })
    }

    /// Removes the entry with the given id. Returns `true` if an entry was
    /// actually removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|entry| entry.id != id);
        self.0.len() < before
    }
}
