//! Key-value persistence backends.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::BufferError;

/// Asynchronous string-keyed JSON storage.
///
/// Every call is atomic with respect to every other call on the same
/// backing storage, including calls made from another process when the
/// backend is shared on disk. Read-modify-write cycles go through
/// [`KeyValueStore::update`] so nothing can land between the read and the
/// write.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value under `key`, or `None` if unset.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, BufferError>> + Send;

    /// Replaces the value under `key`.
    fn set(&self, key: &str, value: Value)
        -> impl Future<Output = Result<(), BufferError>> + Send;

    /// Runs `change` on the current value under `key` while holding the
    /// store's exclusive lock.
    ///
    /// `change` returns the value to write back (`None` leaves the stored
    /// value untouched) together with the caller's result. If `change`
    /// fails, nothing is written.
    fn update<T, F>(&self, key: &str, change: F) -> impl Future<Output = Result<T, BufferError>> + Send
    where
        T: Send + 'static,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T), BufferError> + Send + 'static;
}

/// A single JSON object on disk, rewritten in full on every write.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous contents intact. Each operation
/// holds an OS advisory lock on a sibling `.lock` file, so separate
/// processes (the agent and the operator CLI) sharing one store file see
/// each read-modify-write as a single step.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, BufferError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let key = key.to_string();
        run_blocking(move || {
            let _held = LockFile::acquire(&path, LockMode::Shared)?;
            Ok(read_map(&path)?.remove(&key))
        })
        .await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), BufferError> {
        self.update(key, move |_| Ok((Some(value), ()))).await
    }

    async fn update<T, F>(&self, key: &str, change: F) -> Result<T, BufferError>
    where
        T: Send + 'static,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T), BufferError> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let key = key.to_string();
        run_blocking(move || {
            let _held = LockFile::acquire(&path, LockMode::Exclusive)?;
            let mut map = read_map(&path)?;
            let (next, output) = change(map.get(&key).cloned())?;
            if let Some(value) = next {
                map.insert(key, value);
                write_map(&path, &map)?;
            }
            Ok(output)
        })
        .await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, BufferError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BufferError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| BufferError::Unavailable(format!("store task failed: {e}")))?
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Advisory lock on `<store>.lock`, released when dropped.
struct LockFile {
    _file: File,
}

impl LockFile {
    fn acquire(store_path: &Path, mode: LockMode) -> Result<Self, BufferError> {
        let lock_path = store_path.with_extension("lock");
        let io_err = |source| BufferError::Io {
            path: lock_path.clone(),
            source,
        };
        create_parent(store_path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_err)?;
        let locked = match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        };
        locked.map_err(io_err)?;
        Ok(Self { _file: file })
    }
}

fn create_parent(path: &Path) -> Result<(), BufferError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|source| BufferError::Io {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

fn read_map(path: &Path) -> Result<Map<String, Value>, BufferError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(BufferError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        _ => Err(BufferError::CorruptStore {
            path: path.to_path_buf(),
        }),
    }
}

fn write_map(path: &Path, map: &Map<String, Value>) -> Result<(), BufferError> {
    let io_err = |source| BufferError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = serde_json::to_vec(map)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

/// In-process store for tests and ephemeral runs. Failures can be switched
/// on to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, BufferError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BufferError::Unavailable(format!("read of {key} refused")));
        }
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), BufferError> {
        self.update(key, move |_| Ok((Some(value), ()))).await
    }

    async fn update<T, F>(&self, key: &str, change: F) -> Result<T, BufferError>
    where
        T: Send + 'static,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T), BufferError> + Send + 'static,
    {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BufferError::Unavailable(format!("read of {key} refused")));
        }
        let mut values = self.values.lock().await;
        let (next, output) = change(values.get(key).cloned())?;
        if let Some(value) = next {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(BufferError::Unavailable(format!("write of {key} refused")));
            }
            values.insert(key.to_string(), value);
        }
        Ok(output)
    }
}
