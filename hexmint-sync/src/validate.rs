//! Pre-submission color validation.
//!
//! Check precedence (first failing check wins):
//! 1. `EmptyInput` (empty or whitespace only)
//! 2. `BadLength` (not exactly 7 characters)
//! 3. `MissingHash` / `MultipleHash` (not exactly one `#`)
//! 4. `HashNotLeading` (`#` is not the first character)
//! 5. `AlreadyRegistered` (exact value already in the mirror)
//!
//! The six characters after `#` are not checked for hex digits.

use thiserror::Error;

use hexmint_core::ColorValue;

/// Total length of a color string, `#` included.
pub const COLOR_LEN: usize = 7;

/// Why a raw input was refused before reaching the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter a color")]
    EmptyInput,
    #[error("a color must be exactly {COLOR_LEN} characters including '#'")]
    BadLength,
    #[error("a color must contain '#'")]
    MissingHash,
    #[error("a color may contain only one '#'")]
    MultipleHash,
    #[error("a color must start with '#'")]
    HashNotLeading,
    #[error("{0} is already registered and cannot be minted again")]
    AlreadyRegistered(ColorValue),
}

/// Validate `raw` against the format rules and the colors already known.
pub fn validate_submission(
    raw: &str,
    existing: &[ColorValue],
) -> Result<ColorValue, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if raw.chars().count() != COLOR_LEN {
        return Err(ValidationError::BadLength);
    }
    match raw.matches('#').count() {
        0 => return Err(ValidationError::MissingHash),
        1 => {}
        _ => return Err(ValidationError::MultipleHash),
    }
    if !raw.starts_with('#') {
        return Err(ValidationError::HashNotLeading);
    }
    if existing.iter().any(|color| color.as_str() == raw) {
        return Err(ValidationError::AlreadyRegistered(ColorValue::from(raw)));
    }
    Ok(ColorValue::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn existing() -> Vec<ColorValue> {
        vec![ColorValue::from("#EC5856"), ColorValue::from("#ffffff")]
    }

    #[rstest]
    #[case::empty("", ValidationError::EmptyInput)]
    #[case::blank("       ", ValidationError::EmptyInput)]
    #[case::short("#FFF", ValidationError::BadLength)]
    #[case::long("#FFFFFFF", ValidationError::BadLength)]
    #[case::no_hash("ABCDEFG", ValidationError::MissingHash)]
    #[case::two_hashes("##FFFFF", ValidationError::MultipleHash)]
    #[case::hash_not_leading("a#FFFFF", ValidationError::HashNotLeading)]
    #[case::trailing_hash("FFFFFF#", ValidationError::HashNotLeading)]
    fn format_failures(#[case] raw: &str, #[case] expected: ValidationError) {
        assert_eq!(validate_submission(raw, &existing()), Err(expected));
    }

    #[test]
    fn length_is_checked_before_hash_count() {
        // Two '#' but wrong length: length wins.
        assert_eq!(
            validate_submission("##FF", &[]),
            Err(ValidationError::BadLength)
        );
    }

    #[test]
    fn hash_count_is_checked_before_position() {
        assert_eq!(
            validate_submission("a##FFFF", &[]),
            Err(ValidationError::MultipleHash)
        );
    }

    #[test]
    fn format_is_checked_before_duplicates() {
        let existing = vec![ColorValue::from("#FFF")];
        assert_eq!(
            validate_submission("#FFF", &existing),
            Err(ValidationError::BadLength)
        );
    }

    #[test]
    fn duplicate_is_exact_match() {
        assert_eq!(
            validate_submission("#EC5856", &existing()),
            Err(ValidationError::AlreadyRegistered(ColorValue::from("#EC5856")))
        );
        assert_eq!(
            validate_submission("#ec5856", &existing()),
            Ok(ColorValue::from("#ec5856"))
        );
    }

    #[test]
    fn non_hex_characters_pass() {
        assert_eq!(
            validate_submission("#GGGGGG", &[]),
            Ok(ColorValue::from("#GGGGGG"))
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(
            validate_submission("#éééééé", &[]),
            Ok(ColorValue::from("#éééééé"))
        );
    }
}
