//! DST-aware timestamp normalization rules.
//!
//! Conversion is a pure function of `(instant, zone rule table)`: no
//! system clock, no tz database lookup at runtime. The rule table is passed
//! in explicitly (engine configuration), never read from process globals.
//!
//! The rule shape is intentionally small: one standard phase, one optional
//! daylight phase, and two nth-Sunday transition rules. That covers the
//! destination zones this pipeline reports in (post-2007 US rules); it is
//! not a general tzdata replacement.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};

/// One named offset phase of a zone, e.g. EST at -05:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePhase {
    pub abbrev: String,
    pub offset: FixedOffset,
}

/// "The `nth` Sunday of `month`, at `local_hour` o'clock wall time."
///
/// Wall time is read in the phase that is in effect *before* the switch:
/// standard time for the spring transition, daylight time for the fall one.
/// Every month has at least four of each weekday, so `nth_sunday` ≤ 4
/// always names a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub month: u32,
    pub nth_sunday: u32,
    pub local_hour: u32,
}

impl TransitionRule {
    /// The UTC instant of this transition in `year`, given the offset in
    /// effect just before it.
    fn utc_instant(&self, year: i32, offset_before: FixedOffset) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_weekday_of_month_opt(year, self.month, Weekday::Sun, self.nth_sunday as u8)?;
        let wall = date.and_hms_opt(self.local_hour, 0, 0)?;
        Some(Utc.from_utc_datetime(&(wall - offset_before)))
    }
}

/// Daylight phase plus the rules bounding it within a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaylightRule {
    pub phase: ZonePhase,
    pub starts: TransitionRule,
    pub ends: TransitionRule,
}

/// Offset rule table for one destination zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRules {
    pub name: String,
    pub standard: ZonePhase,
    pub daylight: Option<DaylightRule>,
}

impl ZoneRules {
    /// US Eastern: EST -05:00, EDT -04:00 from the second Sunday of March
    /// at 02:00 standard time to the first Sunday of November at 02:00
    /// daylight time (rules in effect since 2007).
    pub fn us_eastern() -> Self {
        let est = FixedOffset::west_opt(5 * 3600).expect("constant offset in range");
        let edt = FixedOffset::west_opt(4 * 3600).expect("constant offset in range");
        ZoneRules {
            name: "US/Eastern".to_string(),
            standard: ZonePhase {
                abbrev: "EST".to_string(),
                offset: est,
            },
            daylight: Some(DaylightRule {
                phase: ZonePhase {
                    abbrev: "EDT".to_string(),
                    offset: edt,
                },
                starts: TransitionRule {
                    month: 3,
                    nth_sunday: 2,
                    local_hour: 2,
                },
                ends: TransitionRule {
                    month: 11,
                    nth_sunday: 1,
                    local_hour: 2,
                },
            }),
        }
    }

    /// The offset in effect at `instant`.
    ///
    /// Boundary instants resolve by exact UTC comparison against the
    /// transition instants of the instant's own year, not by calendar
    /// date. The daylight window is half-open: the starting instant is
    /// daylight, the ending instant is standard again.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        let Some(daylight) = &self.daylight else {
            return self.standard.offset;
        };
        let year = instant.year();
        let start = daylight.starts.utc_instant(year, self.standard.offset);
        let end = daylight.ends.utc_instant(year, daylight.phase.offset);
        match (start, end) {
            (Some(start), Some(end)) if start <= instant && instant < end => daylight.phase.offset,
            _ => self.standard.offset,
        }
    }

    /// The phase abbreviation in effect at `instant` (EST/EDT for the
    /// Eastern table). Used for log lines, not for output rows.
    pub fn abbrev_at(&self, instant: DateTime<Utc>) -> &str {
        match &self.daylight {
            Some(daylight) if self.offset_at(instant) == daylight.phase.offset => &daylight.phase.abbrev,
            _ => &self.standard.abbrev,
        }
    }
}

/// Rewrite a timestamp to the zone's offset for its exact instant.
///
/// The instant is unchanged; only the offset label moves. Input rows carry
/// UTC (+00:00) and are converted exactly once, after delta application and
/// reference resolution.
pub fn normalize_timestamp(ts: DateTime<FixedOffset>, zone: &ZoneRules) -> DateTime<FixedOffset> {
    let utc = ts.with_timezone(&Utc);
    utc.with_timezone(&zone.offset_at(utc))
}
