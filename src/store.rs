//! Whole-document JSON persistence. The store knows nothing about threads
//! or reactions; it loads and saves the full record set and hands out a
//! document-level lock so each request serializes load -> compute -> save.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Id, Post, User};

const DEFAULT_DB_PATH: &str = "data/db.json";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The full persisted record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_id: Id,
}

impl Document {
    /// Next record id, monotonically increasing by creation order. Always
    /// exceeds every id already in the document, so documents written before
    /// `nextId` existed keep allocating collision-free.
    pub fn allocate_id(&mut self) -> Id {
        let ceiling = self
            .users
            .iter()
            .map(|u| u.id)
            .chain(self.posts.iter().map(|p| p.id))
            .chain(self.comments.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(ceiling) + 1;
        self.next_id
    }
}

pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        info!("[store] Using document at '{}'", path.display());
        Ok(Self { path, lock: Mutex::new(()) })
    }

    /// Resolve the document path from `AGORA_DATA_DIR` (default `data/`).
    pub fn from_env() -> anyhow::Result<Self> {
        let path = match std::env::var("AGORA_DATA_DIR") {
            Ok(dir) => {
                let mut p = PathBuf::from(dir);
                p.push("db.json");
                p
            }
            Err(_) => PathBuf::from(DEFAULT_DB_PATH),
        };
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document-level mutual exclusion. Handlers hold this across their
    /// whole load -> compute -> save sequence; reads take it too, so a load
    /// never observes a half-written file.
    pub fn guard(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read the current document. Missing and unparsable files both fall
    /// back to the empty default; the caller cannot tell the two apart.
    pub fn load(&self) -> Document {
        match std::fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Document>(&bytes) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(
                        "[store] Failed to parse '{}': {e}. Serving empty document.",
                        self.path.display()
                    );
                    Document::default()
                }
            },
            Err(e) => {
                info!(
                    "[store] No document at '{}': {e}. Serving empty document.",
                    self.path.display()
                );
                Document::default()
            }
        }
    }

    /// Overwrite the whole persisted document.
    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, bytes).map_err(|e| {
            error!("[store] Failed to write '{}': {e}", self.path.display());
            StoreError::from(e)
        })
    }
}
