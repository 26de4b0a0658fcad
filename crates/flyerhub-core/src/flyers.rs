//! The persisted flyer artifact: one JSON file, rebuilt whole on every
//! scrape run.
//!
//! The file is the only hand-off channel between the scraping pipeline and
//! the API layer. All four store keys are always present, even when a
//! retailer yielded nothing, so consumers never need to distinguish "not
//! scraped" from "scraped empty".

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{ProductRecord, StoreKey};

/// Name of the artifact file inside the data directory.
pub const FLYERS_FILE: &str = "flyers.json";

#[derive(Debug, Error)]
pub enum FlyerStoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize flyer collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// All scraped records for one run, keyed by store.
///
/// Field order matches the fixed key order of the persisted artifact.
/// Within a store, insertion order is scrape discovery order and is
/// preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerCollection {
    #[serde(default)]
    pub galleria: Vec<ProductRecord>,
    #[serde(default)]
    pub tnt_supermarket: Vec<ProductRecord>,
    #[serde(default)]
    pub foodbasics: Vec<ProductRecord>,
    #[serde(default)]
    pub nofrills: Vec<ProductRecord>,
}

impl FlyerCollection {
    #[must_use]
    pub fn records(&self, store: StoreKey) -> &[ProductRecord] {
        match store {
            StoreKey::Galleria => &self.galleria,
            StoreKey::TntSupermarket => &self.tnt_supermarket,
            StoreKey::Foodbasics => &self.foodbasics,
            StoreKey::Nofrills => &self.nofrills,
        }
    }

    pub fn records_mut(&mut self, store: StoreKey) -> &mut Vec<ProductRecord> {
        match store {
            StoreKey::Galleria => &mut self.galleria,
            StoreKey::TntSupermarket => &mut self.tnt_supermarket,
            StoreKey::Foodbasics => &mut self.foodbasics,
            StoreKey::Nofrills => &mut self.nofrills,
        }
    }

    /// Total record count across all stores.
    #[must_use]
    pub fn total_len(&self) -> usize {
        StoreKey::ALL
            .iter()
            .map(|&store| self.records(store).len())
            .sum()
    }

    /// Loads the last persisted collection from `data_dir`.
    ///
    /// A missing, empty, or corrupt file yields an empty collection: the
    /// API serves whatever was last durably written, and "nothing yet" is a
    /// legitimate state on first start.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(FLYERS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "flyers file is corrupt; serving empty data");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persists the collection to `<data_dir>/flyers.json` as a single
    /// atomic replace: the JSON is written to a temp file in the same
    /// directory and renamed over the previous artifact, so readers never
    /// observe a half-written file.
    ///
    /// # Errors
    ///
    /// Returns [`FlyerStoreError`] if the data directory cannot be created
    /// or the file cannot be written/renamed.
    pub fn save_atomic(&self, data_dir: &Path) -> Result<(), FlyerStoreError> {
        std::fs::create_dir_all(data_dir).map_err(|source| FlyerStoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let path = data_dir.join(FLYERS_FILE);
        let tmp_path = data_dir.join(format!("{FLYERS_FILE}.tmp"));
        let json = serde_json::to_vec_pretty(self)?;

        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            std::fs::rename(&tmp_path, &path)
        };
        write().map_err(|source| FlyerStoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), records = self.total_len(), "flyer data persisted");
        Ok(())
    }
}
