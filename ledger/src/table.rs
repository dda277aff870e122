//! `LedgerTable<T>`: the per-table public API from spec.md §6 — insert,
//! update, upsert, delete, semantic search, interpolated range queries and
//! a post-commit event subscription.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use ledger_core::errors::{LedgerError, LedgerResult, StorageError};
use ledger_core::model::{ChangeOp, EntityChangeEvent, InterpolationMethod, TableDescriptor};
use ledger_storage::Repository;

use crate::ledger::Ledger;
use crate::pipeline;

/// A registered user table, wired to the shared [`Ledger`] singleton.
pub struct LedgerTable<T> {
    ledger: Arc<Ledger>,
    table: Arc<TableDescriptor<T>>,
    repo: Arc<Repository<T>>,
    events: broadcast::Sender<EntityChangeEvent>,
}

impl<T> LedgerTable<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Registers a table against the shared ledger and rebuilds its slice
    /// of the vector index from `sysEmbedding` (spec.md §4.3/§4.8: the
    /// index is never persisted, so every process restart repopulates it).
    pub fn register(ledger: Arc<Ledger>, table: TableDescriptor<T>) -> LedgerResult<Self> {
        let table_name = table.table_name;
        let (tx, _rx) = broadcast::channel(ledger.config().pipeline.event_channel_capacity);

        if table.has_embeddable() {
            let records = ledger
                .storage()
                .with_read(|conn| ledger_storage::queries::embedding::for_table(conn, table_name))?;
            for record in &records {
                ledger.vector_index().add(table_name, &record.entity_id, &record.vector)?;
            }
            info!(table = table_name, rebuilt = records.len(), "vector index rebuilt from sysEmbedding");
        }

        Ok(Self {
            ledger,
            table: Arc::new(table),
            repo: Arc::new(Repository::new(table_name)),
            events: tx,
        })
    }

    pub async fn insert(&self, entities: Vec<T>) -> LedgerResult<()> {
        for entity in entities {
            let entity_id = (self.table.key)(&entity);
            self.write_one(entity_id, Some(entity), ChangeOp::Insert).await?;
        }
        Ok(())
    }

    pub async fn update(&self, entity: T) -> LedgerResult<()> {
        let entity_id = (self.table.key)(&entity);
        self.write_one(entity_id, Some(entity), ChangeOp::Update).await
    }

    /// Update if the row exists, insert otherwise.
    pub async fn upsert(&self, entity: T) -> LedgerResult<()> {
        let entity_id = (self.table.key)(&entity);
        let ledger = self.ledger.clone();
        let repo = self.repo.clone();
        let probe_id = entity_id.clone();
        let exists =
            run_blocking(move || ledger.storage().with_read(|conn| repo.get(conn, &probe_id).map(|r| r.is_some())))
                .await?;
        let op = if exists { ChangeOp::Update } else { ChangeOp::Insert };
        self.write_one(entity_id, Some(entity), op).await
    }

    pub async fn delete(&self, entity_id: impl Into<String>) -> LedgerResult<()> {
        self.write_one(entity_id.into(), None, ChangeOp::Delete).await
    }

    /// Embeds `query_text`, searches this table's vector-index namespace,
    /// and hydrates the matched rows, best score first.
    pub async fn search_embeddings(&self, query_text: &str, top_k: usize) -> LedgerResult<Vec<(T, f32)>> {
        let ledger = self.ledger.clone();
        let text = query_text.to_string();
        let query_vector = run_blocking(move || ledger.embeddings().embed(&text)).await?;

        let table_name = self.table.table_name;
        let hits = self.ledger.vector_index().search(table_name, &query_vector, top_k);

        let ledger = self.ledger.clone();
        let repo = self.repo.clone();
        run_blocking(move || {
            ledger.storage().with_read(|conn| {
                let mut results = Vec::with_capacity(hits.len());
                for (entity_id, distance) in hits {
                    if let Some(entity) = repo.get(conn, &entity_id)? {
                        results.push((entity, distance));
                    }
                }
                Ok(results)
            })
        })
        .await
    }

    pub async fn get_interpolated(
        &self,
        entity_id: &str,
        property_name: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        step: Duration,
        method: InterpolationMethod,
    ) -> LedgerResult<Vec<(DateTime<Utc>, String)>> {
        let ledger = self.ledger.clone();
        let table_name = self.table.table_name;
        let entity_id = entity_id.to_string();
        let property_name = property_name.to_string();
        run_blocking(move || {
            let pairs = ledger.storage().with_read(|conn| {
                ledger_storage::queries::timeseries::all_bases_and_deltas(conn, table_name, &entity_id, &property_name)
            })?;
            let samples = ledger_timeseries::flatten_samples(&pairs)?;
            Ok(ledger_timeseries::interpolate_range(&samples, from, to, step, method))
        })
        .await
    }

    /// Subscribes to this table's post-commit event stream. Dropping the
    /// receiver unsubscribes; a subscriber that falls too far behind is
    /// lagged and skips forward rather than blocking the publisher.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityChangeEvent> {
        self.events.subscribe()
    }

    async fn write_one(&self, entity_id: String, new: Option<T>, op: ChangeOp) -> LedgerResult<()> {
        let ledger = self.ledger.clone();
        let table = self.table.clone();
        let repo = self.repo.clone();
        let changed_by = self.ledger.config().pipeline.default_changed_by.clone();
        let now = Utc::now();
        let render_input = new.clone();

        let event = run_blocking(move || {
            ledger.storage().with_write_tx(move |tx| {
                pipeline::apply_write(tx, &table, &repo, &entity_id, new, op, &changed_by, now)
            })
        })
        .await?;

        self.post_commit_embedding(&event.entity_id, op, render_input).await;

        let _ = self.events.send(event);
        Ok(())
    }

    /// Step 9: re-render, re-embed, and upsert the vector index after
    /// commit. Failures here are logged and swallowed — the write already
    /// committed, and the index is repaired on the next write or restart.
    async fn post_commit_embedding(&self, entity_id: &str, op: ChangeOp, entity: Option<T>) {
        let table_name = self.table.table_name;

        if op == ChangeOp::Delete {
            let ledger = self.ledger.clone();
            let entity_id = entity_id.to_string();
            let result: LedgerResult<()> = run_blocking(move || {
                ledger
                    .storage()
                    .with_write_tx(|tx| ledger_storage::queries::embedding::delete(tx, table_name, &entity_id))?;
                ledger.vector_index().remove(table_name, &entity_id);
                Ok(())
            })
            .await;
            if let Err(err) = result {
                warn!(table = table_name, error = %err, "failed to remove embedding after delete");
            }
            return;
        }

        if !self.table.has_embeddable() {
            return;
        }
        let Some(entity) = entity else { return };
        let Some(text) = ledger_template::render(&self.table, &entity) else { return };

        let ledger = self.ledger.clone();
        let table = self.table.clone();
        let entity_id = entity_id.to_string();
        let result: LedgerResult<()> = run_blocking(move || {
            let vector = ledger.embeddings().embed(&text)?;
            ledger.storage().with_write_tx(|tx| {
                let record = ledger_core::model::EmbeddingRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    table_name: table.table_name.to_string(),
                    entity_id: entity_id.clone(),
                    vector: vector.clone(),
                };
                ledger_storage::queries::embedding::upsert(tx, &record)
            })?;
            ledger.vector_index().update(table.table_name, &entity_id, &vector)?;
            Ok(())
        })
        .await;

        if let Err(err) = result {
            warn!(table = table_name, error = %err, "post-commit embedding upsert failed");
        }
    }
}

/// Runs a blocking closure on tokio's blocking pool, flattening a task
/// panic into a `LedgerError` instead of leaving it as a `JoinError`.
async fn run_blocking<F, R>(f: F) -> LedgerResult<R>
where
    F: FnOnce() -> LedgerResult<R> + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_err) => Err(LedgerError::Storage(StorageError::Sqlite {
            message: format!("blocking task panicked: {join_err}"),
        })),
    }
}
