//! Redis cache for parsed job descriptions.
//!
//! The same posting is usually scored against many resumes, so the JD parse is
//! cached by content hash. Any Redis failure degrades to a cache miss.

use anyhow::Result;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::ats::models::ParsedJobDescription;

/// Bump when `ParsedJobDescription` or the JD prompt changes shape.
const KEY_PREFIX: &str = "ats:jd:v1:";

#[derive(Clone)]
pub struct JdCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl JdCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    pub async fn get(&self, jd_text: &str) -> Option<ParsedJobDescription> {
        let key = cache_key(jd_text);
        match self.try_get(&key).await {
            Ok(Some(parsed)) => {
                debug!(%key, "JD cache hit");
                Some(parsed)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%key, "JD cache read failed: {e:#}");
                None
            }
        }
    }

    pub async fn put(&self, jd_text: &str, parsed: &ParsedJobDescription) {
        let key = cache_key(jd_text);
        if let Err(e) = self.try_put(&key, parsed).await {
            warn!(%key, "JD cache write failed: {e:#}");
        }
    }

    async fn try_get(&self, key: &str) -> Result<Option<ParsedJobDescription>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        // A payload that no longer deserializes is treated as a miss and overwritten later.
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    async fn try_put(&self, key: &str, parsed: &ParsedJobDescription) -> Result<()> {
        let payload = serde_json::to_string(parsed)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, self.ttl_secs).await?;
        Ok(())
    }
}

/// Whitespace-insensitive content hash, so re-pasted postings still hit.
pub fn cache_key(jd_text: &str) -> String {
    let canonical = jd_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}
