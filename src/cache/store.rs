use redis::AsyncCommands;
use redis::Client;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One upstream request: endpoint path plus its encoded, credential-free query
    Request { endpoint: String, query: String },
}

impl CacheKey {
    /// Builds a request key from sorted parameters so equal requests share an entry
    pub fn request(endpoint: &str, params: &[(String, String)]) -> Self {
        let mut pairs: Vec<&(String, String)> = params.iter().collect();
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        CacheKey::Request {
            endpoint: endpoint.trim_matches('/').to_string(),
            query,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Request { endpoint, query } if query.is_empty() => {
                write!(f, "tmdb:{}", endpoint)
            }
            CacheKey::Request { endpoint, query } => write!(f, "tmdb:{}?{}", endpoint, query),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

type MemoryMap = Arc<RwLock<HashMap<String, MemoryEntry>>>;

#[derive(Clone)]
enum Backend {
    Redis(Client),
    Memory(MemoryMap),
}

/// Response cache backed by Redis, or by an in-process map when Redis is not configured
#[derive(Clone)]
pub struct Cache {
    backend: Backend,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until everything queued has been written
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");

        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Redis(_) => "redis",
            Backend::Memory(_) => "memory",
        }
    }
}

impl Cache {
    /// Redis-backed cache. Spawns the background writer, so a Tokio runtime must be running.
    pub fn redis(client: Client) -> (Self, CacheWriterHandle) {
        Self::spawn(Backend::Redis(client))
    }

    /// In-process cache with per-entry expiry
    pub fn in_memory() -> (Self, CacheWriterHandle) {
        Self::spawn(Backend::Memory(Arc::new(RwLock::new(HashMap::new()))))
    }

    fn spawn(backend: Backend) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_backend = backend.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(writer_backend, write_rx, shutdown_rx).await;
        });

        (
            Self { backend, write_tx },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    /// Name of the active backend, for start-up logging
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn cache_writer_task(
        backend: Backend,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(backend = backend.name(), "Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write(&backend, msg).await {
                        tracing::error!(error = %e, "Failed to write to cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write(&backend, msg).await {
                            tracing::error!(
                                error = %e,
                                "Failed to flush cache write during shutdown"
                            );
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write(backend: &Backend, msg: CacheWriteMessage) -> AppResult<()> {
        match backend {
            Backend::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
            }
            Backend::Memory(map) => {
                let entry = MemoryEntry {
                    value: msg.value,
                    expires_at: Instant::now() + Duration::from_secs(msg.ttl),
                };
                let mut map = map.write().await;
                map.retain(|_, e| e.expires_at > Instant::now());
                map.insert(msg.key, entry);
            }
        }
        Ok(())
    }

    /// Retrieves and deserializes a value, `None` on a miss or an expired entry
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let raw: Option<String> = match &self.backend {
            Backend::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                conn.get(key.to_string()).await?
            }
            Backend::Memory(map) => map
                .read()
                .await
                .get(&key.to_string())
                .filter(|entry| entry.expires_at > Instant::now())
                .map(|entry| entry.value.clone()),
        };

        match raw {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for the background writer and returns immediately
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cache_key_sorts_params() {
        let a = CacheKey::request(
            "discover/movie",
            &params(&[("page", "2"), ("with_genres", "16")]),
        );
        let b = CacheKey::request(
            "/discover/movie",
            &params(&[("with_genres", "16"), ("page", "2")]),
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "tmdb:discover/movie?page=2&with_genres=16");
    }

    #[test]
    fn test_cache_key_without_params() {
        let key = CacheKey::request("genre/movie/list", &[]);
        assert_eq!(key.to_string(), "tmdb:genre/movie/list");
    }

    #[tokio::test]
    async fn test_memory_cache_miss() {
        let (cache, _handle) = Cache::in_memory();
        let key = CacheKey::request("movie/popular", &params(&[("page", "1")]));

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_set_in_background_writes_to_memory() {
        let (cache, _handle) = Cache::in_memory();
        let key = CacheKey::request("movie/popular", &params(&[("page", "1")]));
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let (cache, _handle) = Cache::in_memory();
        let key = CacheKey::request("tv/popular", &[]);

        cache.set_in_background(&key, &vec![1, 2, 3], 0);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let retrieved: Option<Vec<i32>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_writes() {
        let (cache, handle) = Cache::in_memory();
        let key = CacheKey::request("search/multi", &params(&[("query", "dune")]));

        for page in 1..=200 {
            let page = page.to_string();
            let queued = CacheKey::request("movie/popular", &params(&[("page", page.as_str())]));
            cache.set_in_background(&queued, &page, 60);
        }
        cache.set_in_background(&key, &"flushed".to_string(), 60);
        handle.shutdown().await;

        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved.as_deref(), Some("flushed"));
    }

    #[tokio::test]
    async fn test_cached_macro_reads_through() {
        let (cache, _handle) = Cache::in_memory();
        let key = CacheKey::request("movie/upcoming", &[]);

        let first: AppResult<u32> =
            crate::cached!(cache, key, 60, async { Ok::<u32, AppError>(7) });
        assert_eq!(first.unwrap(), 7);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second: AppResult<u32> = crate::cached!(cache, key, 60, async {
            Err::<u32, AppError>(AppError::Internal("upstream must not be called".into()))
        });
        assert_eq!(second.unwrap(), 7);
    }
}
