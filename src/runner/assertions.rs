//! Assertions available to checks
//!
//! Each returns [`Error::Assertion`] when it does not hold.

use std::fmt::Debug;

use crate::{Error, Result};

/// Fail unless `condition` holds
pub fn assert_true(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::assertion(message))
    }
}

/// Fail unless `actual == expected`
pub fn assert_equals<T>(actual: &T, expected: &T, message: &str) -> Result<()>
where
    T: PartialEq + Debug + ?Sized,
{
    if actual == expected {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "{} (expected {:?}, found {:?})",
            message, expected, actual
        )))
    }
}

/// Fail unless `text` contains `fragment`
pub fn assert_contains(text: &str, fragment: &str, message: &str) -> Result<()> {
    if text.contains(fragment) {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "{} (missing {:?} in {:?})",
            message, fragment, text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_true() {
        assert!(assert_true(true, "displayed").is_ok());
        assert!(assert_true(false, "displayed").unwrap_err().is_assertion());
    }

    #[test]
    fn test_assert_equals() {
        assert!(assert_equals("SNULinks", "SNULinks", "title").is_ok());
        let err = assert_equals("Loading", "SNULinks", "title").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Assertion failed: title (expected "SNULinks", found "Loading")"#
        );
    }

    #[test]
    fn test_assert_contains() {
        assert!(assert_contains("© 2025", "2025", "year").is_ok());
        assert!(assert_contains("© 2024", "2025", "year").unwrap_err().is_assertion());
    }
}
