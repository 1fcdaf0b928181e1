use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A screening date in the compact `YYYYMMDD` form used across all services.
///
/// Construction is only possible through [`ScreeningDate::parse`], so a value
/// of this type is always eight ASCII digits naming a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreeningDate(String);

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid date format, expected YYYYMMDD")]
pub struct InvalidDate;

impl ScreeningDate {
    /// Validate an 8-digit date string, both syntactically and against the
    /// calendar (e.g. `20240230` is rejected).
    pub fn parse(raw: &str) -> Result<Self, InvalidDate> {
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDate);
        }
        NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| InvalidDate)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ScreeningDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
