//! Expiry Calculator
//!
//! Converts a relative TTL into the absolute timestamp stored with an entry.
//!
//! Timestamps are wall-clock readings in the cache's fixed time zone with
//! whole-second precision, stored as `YYYY-MM-DD HH:MM:SS` text so that
//! lexical and chronological order agree.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound};

/// Storage format of expiry timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Latest storable deadline. Later years need a sign or a fifth digit and
/// would no longer sort lexically.
pub fn max_deadline() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Legacy numeric TTL meaning "never expires".
pub const LEGACY_NEVER_TTL: i64 = 1001;

// == TTL ==
/// Time-to-live of a cache entry, counted in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expire this many minutes after the write. Zero expires at the write instant.
    Minutes(u32),
    /// Never expire.
    Never,
}

impl Default for Ttl {
    /// Matches the historical default of a zero TTL.
    fn default() -> Self {
        Ttl::IMMEDIATE
    }
}

impl Ttl {
    /// An entry that is already due at write time.
    pub const IMMEDIATE: Ttl = Ttl::Minutes(0);

    /// Maps a legacy numeric TTL onto the explicit variants.
    ///
    /// `1001` is the historical never-expire sentinel. Zero and negative
    /// values expire at the write instant; values above `u32::MAX` saturate.
    pub fn from_legacy(minutes: i64) -> Self {
        match minutes {
            LEGACY_NEVER_TTL => Ttl::Never,
            m if m <= 0 => Ttl::IMMEDIATE,
            m => Ttl::Minutes(u32::try_from(m).unwrap_or(u32::MAX)),
        }
    }
}

impl From<i64> for Ttl {
    fn from(minutes: i64) -> Self {
        Ttl::from_legacy(minutes)
    }
}

// == Expiry At ==
/// Computes the absolute expiry for an entry written at `now`.
///
/// Returns `None` for entries that never expire. Deadlines past
/// [`max_deadline`] are clamped to it.
pub fn expiry_at(ttl: Ttl, now: DateTime<FixedOffset>) -> Option<NaiveDateTime> {
    let base = now.naive_local().trunc_subsecs(0);
    match ttl {
        Ttl::Never => None,
        Ttl::Minutes(minutes) => {
            let deadline = base
                .checked_add_signed(Duration::minutes(i64::from(minutes)))
                .unwrap_or(NaiveDateTime::MAX);
            Some(deadline.min(max_deadline()))
        }
    }
}

// == Is Expired ==
/// An entry is expired once the clock reaches its deadline.
pub fn is_expired(expires_at: NaiveDateTime, now: DateTime<FixedOffset>) -> bool {
    now.naive_local() >= expires_at
}

/// Formats a timestamp for storage.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
}
