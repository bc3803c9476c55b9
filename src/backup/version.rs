//! Store versions
//!
//! A store's version is the newest revision timestamp across all of its
//! snapshots. Timestamps are read with one fixed format in one fixed
//! timezone; nothing is inferred from the host's locale.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{PbupError, PbupResult};
use crate::store::SnapshotStore;

/// Textual format of revision timestamps and bundle versions
pub const VERSION_FORMAT: &str = "%Y-%m-%d-%H%M%S";

const VERSION_LEN: usize = "YYYY-MM-DD-HHMMSS".len();

/// The newest activity across all snapshots of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreVersion(DateTime<FixedOffset>);

impl StoreVersion {
    /// Version of a store without snapshots; older than any real revision
    pub fn sentinel(timezone: FixedOffset) -> Self {
        let naive = NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN);
        let at = naive
            .and_local_timezone(timezone)
            .single()
            .unwrap_or_else(|| naive.and_utc().with_timezone(&timezone));
        Self(at)
    }

    /// Parse a `YYYY-MM-DD-HHMMSS` token in the given timezone
    pub fn parse(token: &str, timezone: FixedOffset) -> Option<Self> {
        if token.len() != VERSION_LEN {
            return None;
        }
        let naive = NaiveDateTime::parse_from_str(token, VERSION_FORMAT).ok()?;
        let at = naive.and_local_timezone(timezone).single()?;
        Some(Self(at))
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl fmt::Display for StoreVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(VERSION_FORMAT))
    }
}

/// Resolve the current version of `store`.
///
/// Every call queries the store afresh. An empty store resolves to
/// [`StoreVersion::sentinel`].
pub fn resolve_version(
    store: &dyn SnapshotStore,
    timezone: FixedOffset,
) -> PbupResult<StoreVersion> {
    let root = store.root();
    if !root.is_dir() {
        return Err(PbupError::StoreQuery(format!(
            "backup store is not accessible: {}",
            root.display()
        )));
    }

    let mut version = StoreVersion::sentinel(timezone);
    for name in store.list_snapshots()? {
        let listing = store.list_revisions(&name)?;
        let latest = latest_revision(&name, &listing, timezone)?;
        debug!(snapshot = %name, latest = %latest, "resolved snapshot revision");
        version = version.max(latest);
    }

    Ok(version)
}

/// Timestamp of the terminal line of a revision listing
fn latest_revision(
    name: &str,
    listing: &str,
    timezone: FixedOffset,
) -> PbupResult<StoreVersion> {
    let line = listing
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| PbupError::StoreQuery(format!("snapshot '{}' has no revisions", name)))?;

    let token = line.split_whitespace().last().unwrap_or_default();

    StoreVersion::parse(token, timezone).ok_or_else(|| {
        PbupError::StoreQuery(format!(
            "snapshot '{}': cannot read revision timestamp from '{}'",
            name,
            line.trim()
        ))
    })
}
