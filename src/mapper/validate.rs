//! Field validators.
//!
//! A [`Validator`] turns one raw attribute value or text content into a typed
//! value, or fails with a [`MapError`] qualified by the path it was given.
//! Any `Fn(&Path, &str) -> Result<T, MapError>` is a validator, so ad-hoc
//! rules need no new type:
//!
//! ```
//! use xmlmapper::mapper::{Path, Validator};
//! use xmlmapper::MapError;
//!
//! let upper = |path: &Path, raw: &str| {
//!     if raw.chars().all(|c| c.is_ascii_uppercase()) {
//!         Ok(raw.to_string())
//!     } else {
//!         Err(MapError::invalid(path, "expected upper case"))
//!     }
//! };
//! assert!(upper.parse(&Path::root("r"), "ABC").is_ok());
//! assert!(upper.parse(&Path::root("r"), "abc").is_err());
//! ```

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Path;
use crate::error::MapError;

/// Parses a raw string into a typed value.
pub trait Validator: Send + Sync {
    /// The typed value produced. It becomes part of the mapped record.
    type Output: Serialize;

    /// Parses `raw`, reporting failures against `path`.
    ///
    /// # Errors
    ///
    /// Returns a `MapError` (normally [`MapError::Invalid`]) if `raw` does
    /// not satisfy the validator.
    fn parse(&self, path: &Path, raw: &str) -> Result<Self::Output, MapError>;
}

impl<F, T> Validator for F
where
    F: Fn(&Path, &str) -> Result<T, MapError> + Send + Sync,
    T: Serialize,
{
    type Output = T;

    fn parse(&self, path: &Path, raw: &str) -> Result<T, MapError> {
        self(path, raw)
    }
}

/// Accepts any string, optionally bounded in length.
#[derive(Debug, Clone, Default)]
pub struct StringValidator {
    non_empty: bool,
    max_length: Option<usize>,
}

impl StringValidator {
    #[must_use]
    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Limits the length in characters.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

impl Validator for StringValidator {
    type Output = String;

    fn parse(&self, path: &Path, raw: &str) -> Result<String, MapError> {
        if self.non_empty && raw.is_empty() {
            return Err(MapError::invalid(path, "expected a non-empty string"));
        }
        if let Some(max) = self.max_length {
            let length = raw.chars().count();
            if length > max {
                return Err(MapError::invalid(
                    path,
                    format!("string of length {length} exceeds maximum {max}"),
                ));
            }
        }
        Ok(raw.to_string())
    }
}

/// Parses a decimal `i64`, optionally within inclusive bounds.
#[derive(Debug, Clone, Default)]
pub struct IntegerValidator {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerValidator {
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Validator for IntegerValidator {
    type Output = i64;

    fn parse(&self, path: &Path, raw: &str) -> Result<i64, MapError> {
        let value: i64 = raw
            .parse()
            .map_err(|e| MapError::invalid(path, format!("invalid integer '{raw}': {e}")))?;
        if self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max) {
            return Err(MapError::invalid(
                path,
                format!("integer {value} is out of range"),
            ));
        }
        Ok(value)
    }
}

/// Parses `true`/`1` and `false`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValidator;

impl Validator for BooleanValidator {
    type Output = bool;

    fn parse(&self, path: &Path, raw: &str) -> Result<bool, MapError> {
        match raw {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(MapError::invalid(path, format!("invalid boolean '{raw}'"))),
        }
    }
}

/// Parses an RFC 3339 timestamp into a UTC instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeValidator;

impl Validator for DateTimeValidator {
    type Output = DateTime<Utc>;

    fn parse(&self, path: &Path, raw: &str) -> Result<DateTime<Utc>, MapError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|e| MapError::invalid(path, format!("invalid date-time '{raw}': {e}")))
    }
}

/// Parses any `FromStr` type, e.g. `FromStrValidator::<f64>::new()`.
#[derive(Debug)]
pub struct FromStrValidator<T>(PhantomData<fn() -> T>);

impl<T> FromStrValidator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Validator for FromStrValidator<T>
where
    T: FromStr + Serialize,
    T::Err: Display,
{
    type Output = T;

    fn parse(&self, path: &Path, raw: &str) -> Result<T, MapError> {
        raw.parse()
            .map_err(|e| MapError::invalid(path, format!("invalid value '{raw}': {e}")))
    }
}
