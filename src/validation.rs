//! Checks shared by the request handlers for user supplied fields.

use serde::{Deserialize, Deserializer};

use crate::Error;

/// Trim `value` and check that it is present, not blank and at most `max_length` characters.
///
/// # Errors
/// Returns [Error::MissingField] if the value is absent or blank, or
/// [Error::InvalidField] if it is too long.
pub fn required_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<String, Error> {
    match value.map(str::trim) {
        None | Some("") => Err(Error::MissingField(field)),
        Some(text) => check_length(field, text, max_length).map(str::to_owned),
    }
}

/// Trim `value` and check its length, treating a blank string as absent.
///
/// # Errors
/// Returns [Error::InvalidField] if the value is longer than `max_length` characters.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<Option<String>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => check_length(field, text, max_length).map(|text| Some(text.to_owned())),
    }
}

/// Validate a replacement value for a required text field in a partial update.
///
/// `None` means the field is left unchanged.
pub fn updated_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<Option<String>, Error> {
    value
        .map(|text| required_text(field, Some(text), max_length))
        .transpose()
}

fn check_length<'a>(field: &str, text: &'a str, max_length: usize) -> Result<&'a str, Error> {
    if text.chars().count() > max_length {
        Err(Error::InvalidField(format!(
            "{field} must be at most {max_length} characters"
        )))
    } else {
        Ok(text)
    }
}

/// Check that a monetary amount is present and strictly positive.
///
/// # Errors
/// Returns [Error::MissingField] if the amount is absent, or
/// [Error::InvalidField] if it is zero, negative or not a finite number.
pub fn positive_amount(amount: Option<f64>) -> Result<f64, Error> {
    match amount {
        None => Err(Error::MissingField("amount")),
        Some(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        Some(_) => Err(Error::InvalidField(
            "amount must be greater than 0".to_owned(),
        )),
    }
}

/// Deserialize a field that distinguishes between absent and `null`.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` so that a missing field is `None` and an explicit `null`
/// is `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::Error;

    use super::{deserialize_some, optional_text, positive_amount, required_text, updated_text};

    #[test]
    fn required_text_trims() {
        assert_eq!(
            required_text("title", Some("  Uber  "), 100),
            Ok("Uber".to_owned())
        );
    }

    #[test]
    fn required_text_rejects_blank_and_missing() {
        assert_eq!(
            required_text("title", Some("   "), 100),
            Err(Error::MissingField("title"))
        );
        assert_eq!(
            required_text("title", None, 100),
            Err(Error::MissingField("title"))
        );
    }

    #[test]
    fn required_text_rejects_long_text() {
        let text = "a".repeat(101);

        assert_eq!(
            required_text("title", Some(&text), 100),
            Err(Error::InvalidField(
                "title must be at most 100 characters".to_owned()
            ))
        );
    }

    #[test]
    fn optional_text_treats_blank_as_absent() {
        assert_eq!(optional_text("description", Some(" "), 200), Ok(None));
        assert_eq!(
            optional_text("description", Some("weekend work"), 200),
            Ok(Some("weekend work".to_owned()))
        );
    }

    #[test]
    fn updated_text_rejects_blank_replacement() {
        assert_eq!(updated_text("title", None, 100), Ok(None));
        assert_eq!(
            updated_text("title", Some(""), 100),
            Err(Error::MissingField("title"))
        );
    }

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(positive_amount(Some(12.5)), Ok(12.5));
        assert_eq!(positive_amount(None), Err(Error::MissingField("amount")));

        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(positive_amount(Some(amount)), Err(Error::InvalidField(_))),
                "{amount} should be rejected"
            );
        }
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        hustle_id: Option<Option<i64>>,
    }

    #[test]
    fn deserialize_some_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"hustle_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"hustle_id": 3}"#).unwrap();

        assert_eq!(missing.hustle_id, None);
        assert_eq!(null.hustle_id, Some(None));
        assert_eq!(set.hustle_id, Some(Some(3)));
    }
}
