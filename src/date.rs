//! Parsing of calendar dates sent by clients.

use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Parse an optional date string, e.g. from a query parameter.
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    text.map(parse_date).transpose()
}

/// Today's date in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{parse_date, parse_optional_date};

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2025-01-15"), Ok(date!(2025 - 01 - 15)));
    }

    #[test]
    fn rejects_other_formats() {
        for text in ["15/01/2025", "2025-13-01", "2025-02-30", "", "yesterday"] {
            assert_eq!(
                parse_date(text),
                Err(Error::InvalidDate(text.to_owned())),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn optional_date_passes_none_through() {
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(
            parse_optional_date(Some("2024-02-29")),
            Ok(Some(date!(2024 - 02 - 29)))
        );
    }
}
