//! Append-only log of pending transaction records.
//!
//! The checkout writes one record per confirm attempt and never reads it back.
//! Two backends:
//! - [`JsonlTransactionLog`] - one JSON object per line in a local file
//! - [`MemoryTransactionLog`] - in-process vector, used by tests

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use goldtrust_core::PendingTransaction;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

/// Errors that can occur when appending a record.
#[derive(Debug, Error)]
pub enum TransactionLogError {
    #[error("transaction log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize transaction: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write-only sink for pending transactions.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &PendingTransaction) -> Result<(), TransactionLogError>;
}

/// File-backed log writing JSON Lines.
#[derive(Debug)]
pub struct JsonlTransactionLog {
    path: PathBuf,
    // Serializes writers so lines never interleave
    write_lock: Mutex<()>,
}

impl JsonlTransactionLog {
    /// Create a log appending to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TransactionLog for JsonlTransactionLog {
    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    async fn append(&self, record: &PendingTransaction) -> Result<(), TransactionLogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!(amount = record.amount, "Appended pending transaction");
        Ok(())
    }
}

/// In-memory log.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransactionLog {
    records: Arc<RwLock<Vec<PendingTransaction>>>,
}

impl MemoryTransactionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far.
    pub async fn records(&self) -> Vec<PendingTransaction> {
        self.records.read().await.clone()
    }

    /// Number of records appended so far.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing has been appended yet.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionLog for MemoryTransactionLog {
    async fn append(&self, record: &PendingTransaction) -> Result<(), TransactionLogError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
