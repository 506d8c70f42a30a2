//! Record sets stored as tables of an embedded redb database.
//!
//! Each record set is a table keyed by a `u64` sequence number with the
//! JSON-encoded [`StoredRecord`] as value. Tables are created when the
//! database is opened if they do not exist yet.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::{path::Path, sync::Arc};
use tracing::{debug, instrument};

use crate::{
    error::{TemperatureError, TemperatureResult},
    model::{ReadingEcho, StoredRecord, TemperatureReading},
    sink::{RecordSet, TemperatureSink},
};

const SUCCESS: TableDefinition<u64, &[u8]> = TableDefinition::new("success");
const ALERT: TableDefinition<u64, &[u8]> = TableDefinition::new("alert");
const ERROR: TableDefinition<u64, &[u8]> = TableDefinition::new("error");

fn table_def(set: RecordSet) -> TableDefinition<'static, u64, &'static [u8]> {
    match set {
        RecordSet::Success => SUCCESS,
        RecordSet::Alert => ALERT,
        RecordSet::Error => ERROR,
    }
}

fn storage_err(e: impl std::fmt::Display) -> TemperatureError {
    TemperatureError::persistence(e)
}

/// Thread-safe sink backed by redb. Cloning shares the same database.
#[derive(Clone)]
pub struct EmbeddedSink {
    db: Arc<Database>,
}

impl EmbeddedSink {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> TemperatureResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let db = Database::create(path).map_err(storage_err)?;
        let sink = Self { db: Arc::new(db) };
        sink.ensure_tables()?;
        debug!(?path, "temperature store opened");
        Ok(sink)
    }

    /// Ephemeral in-memory database.
    pub fn open_in_memory() -> TemperatureResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder().create_with_backend(backend).map_err(storage_err)?;
        let sink = Self { db: Arc::new(db) };
        sink.ensure_tables()?;
        Ok(sink)
    }

    fn ensure_tables(&self) -> TemperatureResult<()> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        for set in RecordSet::all() {
            txn.open_table(table_def(*set)).map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;
        Ok(())
    }

    /// Append `record` to every set in `sets` within one write transaction.
    pub fn append(&self, sets: &[RecordSet], record: &StoredRecord) -> TemperatureResult<()> {
        let value = serde_json::to_vec(record).map_err(storage_err)?;

        let txn = self.db.begin_write().map_err(storage_err)?;
        for set in sets {
            let mut table = txn.open_table(table_def(*set)).map_err(storage_err)?;
            let next = match table.last().map_err(storage_err)? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            table.insert(next, value.as_slice()).map_err(storage_err)?;
            debug!(set = %set, key = next, "record appended");
        }
        txn.commit().map_err(storage_err)?;
        Ok(())
    }

    /// All records of one set in insertion order.
    pub fn records(&self, set: RecordSet) -> TemperatureResult<Vec<StoredRecord>> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(table_def(set)).map_err(storage_err)?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            records.push(serde_json::from_slice(value.value()).map_err(storage_err)?);
        }
        Ok(records)
    }

    pub fn count(&self, set: RecordSet) -> TemperatureResult<u64> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = txn.open_table(table_def(set)).map_err(storage_err)?;
        table.len().map_err(storage_err)
    }
}

#[async_trait]
impl TemperatureSink for EmbeddedSink {
    #[instrument(skip(self))]
    async fn save_temperature(
        &self,
        reading: &TemperatureReading,
    ) -> TemperatureResult<ReadingEcho> {
        let reading = *reading;
        let sink = self.clone();

        tokio::task::spawn_blocking(move || {
            sink.append(&RecordSet::targets(&reading), &StoredRecord::now(reading))
        })
        .await
        .map_err(storage_err)??;

        Ok(reading.echo())
    }
}
