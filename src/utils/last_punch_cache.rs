use anyhow::Result;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::collections::HashMap;
use std::time::Duration;

use crate::attendance::policy::LastPunch;

type Key = (String, String);

/// Latest punch per (subdomain, rfid). The database stays authoritative:
/// misses fall through to a query and every stored punch refreshes its entry.
#[derive(Clone)]
pub struct LastPunchCache {
    inner: Cache<Key, LastPunch>,
}

impl LastPunchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(ttl)
                .build(),
        }
    }

    fn key(subdomain: &str, rfid: &str) -> Key {
        (subdomain.to_string(), rfid.to_string())
    }

    pub async fn get(&self, subdomain: &str, rfid: &str) -> Option<LastPunch> {
        self.inner.get(&Self::key(subdomain, rfid)).await
    }

    pub async fn record(&self, subdomain: &str, rfid: &str, punch: LastPunch) {
        self.inner.insert(Self::key(subdomain, rfid), punch).await;
    }

    /// Cached value, or the newest stored punch for this worker.
    pub async fn lookup(
        &self,
        pool: &MySqlPool,
        subdomain: &str,
        rfid: &str,
    ) -> Result<Option<LastPunch>, sqlx::Error> {
        if let Some(hit) = self.get(subdomain, rfid).await {
            return Ok(Some(hit));
        }

        let row = sqlx::query_as::<_, (bool, DateTime<Utc>)>(
            r#"
            SELECT presence, created_at
            FROM attendance
            WHERE subdomain = ? AND rfid = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(subdomain)
        .bind(rfid)
        .fetch_optional(pool)
        .await?;

        let last = row.map(|(presence, occurred_at)| LastPunch {
            presence,
            occurred_at,
        });

        if let Some(last) = last {
            self.record(subdomain, rfid, last).await;
        }

        Ok(last)
    }

    /// Batch insert; later punches in `batch` win over earlier ones for the same key.
    async fn batch_record(&self, batch: &[(String, String, LastPunch)]) {
        let latest: HashMap<Key, LastPunch> = batch
            .iter()
            .map(|(subdomain, rfid, punch)| ((subdomain.clone(), rfid.clone()), *punch))
            .collect();

        let futures: Vec<_> = latest
            .into_iter()
            .map(|(key, punch)| self.inner.insert(key, punch))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }

    /// Load the latest punch of every worker active in the last `days` days (batched)
    pub async fn warmup(&self, pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String, String, bool, DateTime<Utc>)>(
            r#"
            SELECT subdomain, rfid, presence, created_at
            FROM attendance
            WHERE rfid IS NOT NULL AND rfid <> ''
              AND created_at >= NOW() - INTERVAL ? DAY
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(days)
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total_count = 0usize;

        while let Some(row) = stream.next().await {
            let (subdomain, rfid, presence, occurred_at) = row?;
            batch.push((
                subdomain,
                rfid,
                LastPunch {
                    presence,
                    occurred_at,
                },
            ));
            total_count += 1;

            if batch.len() >= batch_size {
                self.batch_record(&batch).await;
                batch.clear();
            }
        }

        // Insert any remaining punches
        if !batch.is_empty() {
            self.batch_record(&batch).await;
        }

        log::info!(
            "Last punch cache warmup complete: {} punches (last {} days)",
            total_count,
            days
        );

        Ok(())
    }
}
