//! Durable key/value storage.
//!
//! Every list the app persists (health entries, mood history, appointments,
//! session plans) is one JSON blob under one fixed key. The [`KeyValue`]
//! trait is the whole storage boundary; [`SqliteKv`] is the production
//! implementation, a single `kv` table in SQLite owned by a dedicated
//! worker thread so the async side never blocks on disk I/O.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tokio::sync::oneshot;

mod migrations;

use migrations::run_migrations;

/// The durable storage layer failed to read or write. Surfaced to the UI
/// layer for user-visible reporting; never retried down here.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// Generic durable key/value interface: the only boundary the stores see.
/// `delete` of an absent key succeeds.
#[async_trait]
pub trait KeyValue: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError>;
    async fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

type KvTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum KvCommand {
    Execute(KvTask),
    Shutdown,
}

struct SqliteKvInner {
    sender: mpsc::Sender<KvCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SqliteKvInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(KvCommand::Shutdown) {
                error!("Failed to send shutdown to storage thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join storage thread: {join_err:?}");
            }
        }
    }
}

/// SQLite-backed [`KeyValue`] store. Cheap to clone; all clones share the
/// worker thread owning the connection.
#[derive(Clone)]
pub struct SqliteKv {
    inner: Arc<SqliteKvInner>,
    db_path: Arc<PathBuf>,
}

impl SqliteKv {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<KvCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("calmify-storage".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run storage migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("Storage initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        KvCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        KvCommand::Shutdown => break,
                    }
                }

                info!("Storage thread shutting down");
            })
            .with_context(|| "failed to spawn storage worker thread")?;

        ready_rx
            .recv()
            .context("storage worker exited before signaling readiness")??;

        info!("Storage initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(SqliteKvInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Connection) -> Result<T, PersistenceError> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = KvCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Storage caller dropped before receiving result");
            }
        }));

        sender.send(command).map_err(|err| {
            PersistenceError::Backend(format!("failed to reach storage thread: {err}"))
        })?;

        reply_rx
            .await
            .map_err(|_| PersistenceError::Backend("storage thread terminated".into()))?
    }
}

#[async_trait]
impl KeyValue for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| PersistenceError::Read(err.to_string()))
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|err| PersistenceError::Write(err.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(|err| PersistenceError::Write(err.to_string()))?;
            Ok(())
        })
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, SqliteKv) {
        let dir = tempfile::tempdir().expect("temp dir");
        let kv = SqliteKv::open(dir.path().join("test.sqlite3")).expect("open store");
        (dir, kv)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (_dir, kv) = open_temp();
        kv.set("healthData", "[1,2,3]".into()).await.unwrap();
        assert_eq!(kv.get("healthData").await.unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[tokio::test]
    async fn get_of_absent_key_is_none() {
        let (_dir, kv) = open_temp();
        assert!(kv.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let (_dir, kv) = open_temp();
        kv.set("k", "old".into()).await.unwrap();
        kv.set("k", "new".into()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, kv) = open_temp();
        kv.set("k", "v".into()).await.unwrap();
        kv.delete("k").await.unwrap();
        assert!(kv.get("k").await.unwrap().is_none());
        // Deleting again must still succeed.
        kv.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("test.sqlite3");
        {
            let kv = SqliteKv::open(path.clone()).expect("open store");
            kv.set("k", "persisted".into()).await.unwrap();
        }
        let kv = SqliteKv::open(path).expect("reopen store");
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("persisted"));
    }
}
