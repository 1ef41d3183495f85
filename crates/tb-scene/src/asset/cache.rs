use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, join_all};
use log::{debug, info, warn};

use crate::asset::{AssetSource, Drawable};
use crate::error::AssetLoadError;

type PendingLoad = Shared<BoxFuture<'static, Result<Drawable, AssetLoadError>>>;

enum Entry {
    Loading(PendingLoad),
    Ready(Drawable),
}

/// Resolves asset references to drawables, loading each one at most once.
///
/// Concurrent [`resolve`](Self::resolve) calls for a reference that is still
/// loading share the in-flight load. Successful loads are retained for the
/// lifetime of the cache; failed loads are forgotten so the next call retries.
pub struct AssetCache {
    source: Arc<dyn AssetSource>,
    entries: Mutex<HashMap<String, Entry>>,
    loads_started: AtomicUsize,
}

impl AssetCache {
    /// Create an empty cache in front of `source`.
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
            loads_started: AtomicUsize::new(0),
        }
    }

    /// Resolve `reference` to a drawable, loading it if needed.
    pub async fn resolve(&self, reference: &str) -> Result<Drawable, AssetLoadError> {
        let pending = {
            let mut entries = self.lock();
            match entries.get(reference) {
                Some(Entry::Ready(drawable)) => return Ok(drawable.clone()),
                Some(Entry::Loading(pending)) => {
                    debug!("joining in-flight load of {reference}");
                    pending.clone()
                }
                None => {
                    let pending = self.start_load(reference);
                    entries.insert(reference.to_string(), Entry::Loading(pending.clone()));
                    pending
                }
            }
        };

        let result = pending.clone().await;

        // Only the load that owns the entry may settle it; a retry may already
        // have replaced a failed one.
        let mut entries = self.lock();
        let owns_entry = matches!(
            entries.get(reference),
            Some(Entry::Loading(current)) if current.ptr_eq(&pending)
        );
        if owns_entry {
            match &result {
                Ok(drawable) => {
                    entries.insert(reference.to_string(), Entry::Ready(drawable.clone()));
                }
                Err(err) => {
                    warn!("{err}");
                    entries.remove(reference);
                }
            }
        }
        result
    }

    /// Load a batch of references up front. Returns the failures.
    pub async fn preload<I, R>(&self, references: I) -> Vec<AssetLoadError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let references: Vec<R> = references.into_iter().collect();
        let results = join_all(references.iter().map(|r| self.resolve(r.as_ref()))).await;
        let failures: Vec<AssetLoadError> = results.into_iter().filter_map(Result::err).collect();
        info!(
            "preloaded {} asset(s), {} failed",
            references.len() - failures.len(),
            failures.len()
        );
        failures
    }

    /// Whether `reference` has finished loading successfully.
    pub fn is_cached(&self, reference: &str) -> bool {
        matches!(self.lock().get(reference), Some(Entry::Ready(_)))
    }

    /// Number of successfully loaded assets.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|e| matches!(e, Entry::Ready(_)))
            .count()
    }

    /// Whether no asset has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many underlying loads have been issued so far.
    pub fn loads_started(&self) -> usize {
        self.loads_started.load(Ordering::Relaxed)
    }

    fn start_load(&self, reference: &str) -> PendingLoad {
        info!("loading asset {reference}");
        self.loads_started.fetch_add(1, Ordering::Relaxed);
        let load = self.source.load(reference);
        let reference = reference.to_string();
        async move {
            load.await
                .map_err(|cause| AssetLoadError::new(reference, cause))
        }
        .boxed()
        .shared()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("cached", &self.len())
            .field("loads_started", &self.loads_started())
            .finish()
    }
}
