//! Password Verifier
//! Mission: Check plaintext passwords against bcrypt hashes without blocking the runtime

use anyhow::{Context, Result};
use tracing::debug;

/// bcrypt work-factor bounds
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Plaintext used only to build the dummy hash. Never matches a stored account.
const TIMING_EQUALIZER: &str = "campus-portal/no-such-account";

/// Work factor encoded in a bcrypt hash (`$2b$NN$...`).
pub fn hash_cost(hash: &str) -> Option<u32> {
    let mut parts = hash.split('$');
    if !parts.next()?.is_empty() {
        return None;
    }
    let _version = parts.next()?;
    let cost: u32 = parts.next()?.parse().ok()?;
    (BCRYPT_MIN_COST..=BCRYPT_MAX_COST)
        .contains(&cost)
        .then_some(cost)
}

/// bcrypt hashing and verification on the blocking thread pool
pub struct PasswordVerifier {
    cost: u32,
    dummy_cost: u32,
    dummy_hash: String,
}

impl PasswordVerifier {
    /// `cost` is the bcrypt work factor for new hashes (4..=31).
    /// The unknown-account dummy hash uses the same cost.
    pub fn new(cost: u32) -> Result<Self> {
        Self::calibrated(cost, None)
    }

    /// Like `new`, but the dummy hash takes its cost from `reference_hash`
    /// (a hash already in the store), so unknown accounts cost as much as
    /// the stored ones even when `cost` has since changed.
    pub fn calibrated(cost: u32, reference_hash: Option<&str>) -> Result<Self> {
        let dummy_cost = match reference_hash {
            Some(hash) => hash_cost(hash)
                .context("Stored password hash has no valid bcrypt cost")?,
            None => cost,
        };
        let dummy_hash =
            bcrypt::hash(TIMING_EQUALIZER, dummy_cost).context("Failed to hash password")?;
        debug!(
            "Password verifier ready (bcrypt cost {}, dummy cost {})",
            cost, dummy_cost
        );
        Ok(Self {
            cost,
            dummy_cost,
            dummy_hash,
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Work factor spent on unknown accounts.
    pub fn dummy_cost(&self) -> u32 {
        self.dummy_cost
    }

    /// Verify `password` against `stored_hash`.
    ///
    /// When there is no stored hash (unknown account) the password is still
    /// run through bcrypt against a dummy hash, so both failure causes cost
    /// the same time. Returns `Ok(false)` for every mismatch.
    pub async fn verify(&self, password: String, stored_hash: Option<String>) -> Result<bool> {
        let has_account = stored_hash.is_some();
        let target = stored_hash.unwrap_or_else(|| self.dummy_hash.clone());

        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &target))
            .await
            .context("Password verification task failed")?
            .context("Failed to verify password")?;

        Ok(matched && has_account)
    }

    /// Hash a new password with the configured cost.
    pub async fn hash(&self, password: String) -> Result<String> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("Password hashing task failed")?
            .context("Failed to hash password")
    }
}
