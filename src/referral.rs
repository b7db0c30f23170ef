//! # Referral
//!
//! Referral aggregates as reported by the referral contract, referral links,
//! and the locally remembered referrer.
//!
//! The client never computes the referral tree; it only displays what the
//! contract reports. See [`crate::reader::ContractReader::read_referral`].
//!
//! ## Cache Format
//!
//! The remembered referrer is a single account id stored under the fixed key
//! [`REFERRAL_CACHE_KEY`] in a borsh-encoded file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use borsh::{BorshDeserialize, BorshSerialize};
use near_api::AccountId;

use crate::error::CacheError;
use crate::units::Amount;

/// Depth of the team breakdown reported by `get_team_by_levels`.
pub const REFERRAL_LEVELS: usize = 6;

/// Key under which the referrer is cached.
pub const REFERRAL_CACHE_KEY: &str = "limitless_referral";

/// Query parameter carrying the referrer in a referral link.
const REF_PARAM: &str = "ref";

#[derive(Clone, Debug, PartialEq)]
pub struct ReferralSummary {
    pub referrer: Option<AccountId>,
    pub is_registered: bool,
    pub direct_referrals: u64,
    pub total_team_size: u64,
    /// Commission earned, in stablecoin.
    pub total_earned: Amount,
    /// Team members per level, level 1 first.
    pub team_by_levels: [u64; REFERRAL_LEVELS],
    pub commission_count: u64,
}

// ============================================================================
// Links
// ============================================================================

/// Builds `{base_url}?ref={account}`, appending to an existing query if any.
pub fn referral_link(base_url: &str, account: &AccountId) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{REF_PARAM}={account}")
}

/// Extracts a valid referrer account id from a referral link.
///
/// ```
/// use limitless_client::referral::referrer_from_link;
///
/// let referrer = referrer_from_link("https://limitless.app/mint?ref=bob.near");
/// assert_eq!(referrer.unwrap().as_str(), "bob.near");
/// assert!(referrer_from_link("https://limitless.app/mint").is_none());
/// ```
pub fn referrer_from_link(link: &str) -> Option<AccountId> {
    let query = link.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == REF_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

// ============================================================================
// Cache
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Default)]
struct CacheFile {
    entries: BTreeMap<String, String>,
}

/// File-backed store for the referrer captured from a referral link.
#[derive(Clone, Debug)]
pub struct ReferralCache {
    path: PathBuf,
}

impl ReferralCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached referrer, or `None` if nothing (valid) is stored.
    pub fn load(&self) -> Result<Option<AccountId>, CacheError> {
        let file = self.read_file()?;
        Ok(file
            .entries
            .get(REFERRAL_CACHE_KEY)
            .and_then(|value| value.parse().ok()))
    }

    pub fn store(&self, referrer: &AccountId) -> Result<(), CacheError> {
        let mut file = self.read_file()?;
        file.entries
            .insert(REFERRAL_CACHE_KEY.to_string(), referrer.to_string());
        self.write_file(&file)
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        let mut file = self.read_file()?;
        if file.entries.remove(REFERRAL_CACHE_KEY).is_some() {
            self.write_file(&file)?;
        }
        Ok(())
    }

    fn read_file(&self) -> Result<CacheFile, CacheError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                CacheFile::try_from_slice(&bytes).map_err(|e| CacheError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CacheFile::default()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn write_file(&self, file: &CacheFile) -> Result<(), CacheError> {
        let bytes = borsh::to_vec(file).map_err(CacheError::Io)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        tracing::debug!("Referral cache written: path={}", self.path.display());
        Ok(())
    }
}
