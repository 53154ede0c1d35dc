//! `YYYYMM` month codes.
//!
//! Delta files are named `{table}_{YYYYMM}.csv` and must be applied in
//! strictly ascending month order. `MonthCode` carries that ordering.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month in the delta timeline, e.g. `202502`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthCode {
    year: i32,
    month: u32,
}

impl MonthCode {
    pub fn new(year: i32, month: u32) -> Result<Self, ModelError> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(ModelError::InvalidMonthCode {
                raw: format!("{year:04}{month:02}"),
            });
        }
        Ok(MonthCode { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for MonthCode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || ModelError::InvalidMonthCode {
            raw: raw.to_string(),
        };
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = raw[..4].parse().map_err(|_| invalid())?;
        let month: u32 = raw[4..].parse().map_err(|_| invalid())?;
        MonthCode::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for MonthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for MonthCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthCode> for String {
    fn from(value: MonthCode) -> Self {
        value.to_string()
    }
}

/// Parse a comma-separated month list (`"202502,202503"`).
///
/// Empty segments are skipped; whitespace around codes is tolerated. The
/// list is returned in the order given; callers decide whether to require
/// ascending order (the merge engine does).
pub fn parse_month_list(raw: &str) -> Result<Vec<MonthCode>, ModelError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(MonthCode::from_str)
        .collect()
}
