//! Timestamp rendering in a fixed UTC offset
//!
//! Every stamp written into the README or the ledger goes through a `Clock`,
//! so callers pass `now` in explicitly and tests can pin it.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::SyncError;

/// Formats instants in one fixed offset with a short zone label
#[derive(Debug, Clone)]
pub struct Clock {
    offset: FixedOffset,
    zone_label: String,
}

impl Clock {
    /// Create a clock for `utc_offset_hours` (-23..=23)
    pub fn new(utc_offset_hours: i32, zone_label: impl Into<String>) -> Result<Self, SyncError> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| SyncError::InvalidConfig(format!("UTC offset out of range: {}h", utc_offset_hours)))?;
        Ok(Self {
            offset,
            zone_label: zone_label.into(),
        })
    }

    /// `YYYY-MM-DD HH:MM <zone>`, used for status lines and history entries
    pub fn stamp(&self, now: DateTime<Utc>) -> String {
        let local = now.with_timezone(&self.offset);
        format!("{} {}", local.format("%Y-%m-%d %H:%M"), self.zone_label)
    }

    /// `YYYY-MM-DD`, used for the regeneration footer
    pub fn date(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset).format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_applies_offset() {
        let clock = Clock::new(8, "SGT").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 20, 5, 0).unwrap();

        assert_eq!(clock.stamp(now), "2025-03-02 04:05 SGT");
        assert_eq!(clock.date(now), "2025-03-02");
    }

    #[test]
    fn test_negative_offset() {
        let clock = Clock::new(-5, "EST").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, 0).unwrap();

        assert_eq!(clock.stamp(now), "2024-12-31 21:00 EST");
    }

    #[test]
    fn test_out_of_range_offset_rejected() {
        assert!(Clock::new(24, "X").is_err());
        assert!(Clock::new(i32::MAX, "X").is_err());
    }
}
