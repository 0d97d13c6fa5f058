use crate::prelude::*;
use chrono::{Local, Months, NaiveDate};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const FAR_PAST_MONTHS: u32 = 100 * 12;

/// Calendar date kept in its zero-padded `YYYY-MM-DD` form.
///
/// The string form sorts lexicographically in chronological order, so the
/// appointment tree compares dates as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date(String);

impl Date {
    /// Parses a `YYYY-MM-DD` date, normalizing it to the zero-padded form.
    /// # Errors
    /// Fails with `ErrorKind::InvalidDate` if the input is not a calendar date.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self::from_naive)
            .map_err(|e| {
                debug!("date {:?} rejected: {}", s, e);
                Kind::InvalidDate(s.to_owned()).into()
            })
    }

    /// Builds a date from a chrono calendar date.
    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    /// Current local date.
    #[must_use]
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    /// Date one hundred years before today, the lower bound used to list
    /// every stored appointment.
    #[must_use]
    pub fn far_past() -> Self {
        let today = Local::now().date_naive();
        let date = today
            .checked_sub_months(Months::new(FAR_PAST_MONTHS))
            .unwrap_or(NaiveDate::MIN);
        Self::from_naive(date)
    }

    /// The `YYYY-MM-DD` representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Date {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Date> for String {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl AsRef<str> for Date {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_padding() {
        let date = Date::parse("2024-3-1").unwrap();
        assert_eq!(date.as_str(), "2024-03-01");
    }

    #[test]
    fn parse_rejects_non_dates() {
        for input in ["", "2024-02-30", "01-02-2024", "tomorrow"] {
            let err = Date::parse(input).unwrap_err();
            assert_eq!(err.kind(), Kind::InvalidDate(input.to_owned()));
        }
    }

    #[test]
    fn string_order_is_chronological() {
        let mut dates: Vec<Date> = ["2024-03-01", "2023-12-31", "2024-01-15", "2024-02-10"]
            .iter()
            .map(|s| Date::parse(s).unwrap())
            .collect();
        dates.sort();
        let sorted: Vec<&str> = dates.iter().map(Date::as_str).collect();
        assert_eq!(
            sorted,
            vec!["2023-12-31", "2024-01-15", "2024-02-10", "2024-03-01"]
        );
    }

    #[test]
    fn far_past_precedes_today() {
        assert!(Date::far_past() < Date::today());
    }

    #[test]
    fn serde_uses_plain_string() {
        let date = Date::parse("2024-04-01").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-04-01\"");
        assert!(serde_json::from_str::<Date>("\"2024-13-01\"").is_err());
    }
}
