use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use moka::future::Cache;
use sqlx::AnyPool;
use tracing::info;

use crate::utils::db_utils::normalize_email;

/// In-memory set of emails known to be taken.
///
/// A hint, not a source of truth: a miss says nothing, a hit is confirmed
/// against `users` before anything is rejected (entries can go stale when
/// another instance or a manual delete removes the row), and the UNIQUE
/// constraint on `users.email` stays authoritative.
#[derive(Clone)]
pub struct EmailRegistry {
    taken: Cache<String, ()>,
}

impl Default for EmailRegistry {
    fn default() -> Self {
        Self::new(500_000, Duration::from_secs(86400)) // 24h TTL
    }
}

impl EmailRegistry {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            taken: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.taken.get(&normalize_email(email)).await.is_some()
    }

    pub async fn mark_taken(&self, email: &str) {
        self.taken.insert(normalize_email(email), ()).await;
    }

    /// Called once the owning user row is gone.
    pub async fn forget(&self, email: &str) {
        self.taken.invalidate(&normalize_email(email)).await;
    }

    async fn batch_mark(&self, emails: &[String]) {
        let futures: Vec<_> = emails
            .iter()
            .map(|e| self.taken.insert(normalize_email(e), ()))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }

    /// Streams every registered email into the cache in batches.
    pub async fn warmup(&self, pool: &AnyPool, batch_size: usize) -> Result<usize> {
        let mut stream = sqlx::query_scalar::<_, String>("SELECT email FROM users").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total += 1;

            if batch.len() >= batch_size {
                self.batch_mark(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.batch_mark(&batch).await;
        }

        info!(total, "Email registry warmup complete");
        Ok(total)
    }
}
