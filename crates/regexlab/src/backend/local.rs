//! In-process regex service.
//!
//! Validation and matching use the `regex` crate; shared pairs live in
//! memory and expire after a fixed lifetime, like the records held by the
//! remote service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::debug;

use super::{BackendType, RegexService};
use crate::error::{LabError, Result};
use crate::types::{MatchSet, RegexPair, ShareId, ShareRecord};

/// How long a shared pair stays resolvable (24 hours).
pub const DEFAULT_SHARE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Length of generated share identifiers, in hex digits.
const SHARE_ID_LEN: usize = 8;

#[derive(Debug, Clone)]
struct StoredShare {
    record: ShareRecord,
    expires_at: Instant,
}

impl StoredShare {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A regex service running inside the client process.
#[derive(Debug)]
pub struct LocalService {
    shares: Mutex<HashMap<String, StoredShare>>,
    ttl: Duration,
}

impl Default for LocalService {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalService {
    /// Create a service whose shares live for [`DEFAULT_SHARE_TTL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SHARE_TTL)
    }

    /// Create a service with a custom share lifetime.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            shares: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored shares, expired ones not yet swept included.
    #[must_use]
    pub fn share_count(&self) -> usize {
        self.shares
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Drop every expired share, returning how many were removed.
    ///
    /// Every `share` call already sweeps, so this is only needed to release
    /// memory when nothing is being shared.
    pub fn cleanup_expired(&self) -> usize {
        let mut shares = self
            .shares
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::sweep(&mut shares, Instant::now())
    }

    fn sweep(shares: &mut HashMap<String, StoredShare>, now: Instant) -> usize {
        let before = shares.len();
        shares.retain(|_, share| !share.is_expired(now));
        let removed = before - shares.len();
        if removed > 0 {
            debug!(removed, "cleaned up expired shares");
        }
        removed
    }

    fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(pattern).map_err(|_| LabError::invalid_pattern(pattern))
    }

    fn generate_id(shares: &HashMap<String, StoredShare>) -> String {
        loop {
            let id = format!("{:0width$x}", rand::random::<u32>(), width = SHARE_ID_LEN);
            if !shares.contains_key(&id) {
                return id;
            }
        }
    }
}

impl RegexService for LocalService {
    async fn validate(&self, pattern: &str) -> Result<bool> {
        Ok(Regex::new(pattern).is_ok())
    }

    async fn evaluate(&self, pattern: &str, test_string: &str) -> Result<MatchSet> {
        let regex = Self::compile(pattern)?;
        Ok(regex
            .find_iter(test_string)
            .map(|m| m.as_str().to_string())
            .collect())
    }

    async fn share(&self, pair: &RegexPair) -> Result<ShareId> {
        Self::compile(&pair.pattern)?;

        let mut shares = self
            .shares
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();
        Self::sweep(&mut shares, now);
        let id = Self::generate_id(&shares);
        shares.insert(
            id.clone(),
            StoredShare {
                record: pair.clone(),
                expires_at: now + self.ttl,
            },
        );
        debug!(share_id = %id, "stored share");
        Ok(ShareId::new(id))
    }

    async fn resolve(&self, id: &ShareId) -> Result<ShareRecord> {
        let mut shares = self
            .shares
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match shares.get(id.as_str()) {
            Some(share) if share.is_expired(Instant::now()) => {
                shares.remove(id.as_str());
                Err(LabError::not_found(id.as_str()))
            }
            Some(share) => Ok(share.record.clone()),
            None => Err(LabError::not_found(id.as_str())),
        }
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Local
    }
}
