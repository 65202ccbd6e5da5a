//! Placeholder resolution in TOML documents.

use serde::de::DeserializeOwned;

use crate::{DataMap, ReplacementValue, TokenPattern};

/// Parse a struct from TOML data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`toml::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_slice<'a, T: DeserializeOwned, M>(data: &[u8], pattern: &TokenPattern, values: &'a M) -> Result<T, Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	from_str(std::str::from_utf8(data)?, pattern, values)
}

/// Parse a struct from TOML data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`toml::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_str<'a, T: DeserializeOwned, M>(data: &str, pattern: &TokenPattern, values: &'a M) -> Result<T, Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	let mut value: toml::Value = toml::from_str(data)?;
	resolve_string_values(&mut value, pattern, values);
	Ok(T::deserialize(value)?)
}

/// Resolve placeholders in all string values of a TOML value.
///
/// Table keys are left alone.
pub fn resolve_string_values<'a, M>(value: &mut toml::Value, pattern: &TokenPattern, values: &'a M)
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	visit_string_values(value, |value| {
		*value = crate::resolve_to_string(value.as_str(), pattern, values);
	})
}

/// Error for parsing TOML with placeholder resolution.
#[derive(Debug)]
pub enum Error {
	/// The input contains invalid UTF-8.
	InvalidUtf8(std::str::Utf8Error),

	/// An error occurred while parsing TOML.
	Toml(toml::de::Error),
}

impl From<std::str::Utf8Error> for Error {
	#[inline]
	fn from(other: std::str::Utf8Error) -> Self {
		Self::InvalidUtf8(other)
	}
}

impl From<toml::de::Error> for Error {
	#[inline]
	fn from(other: toml::de::Error) -> Self {
		Self::Toml(other)
	}
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidUtf8(e) => std::fmt::Display::fmt(e, f),
			Self::Toml(e) => std::fmt::Display::fmt(e, f),
		}
	}
}

/// Recursively apply a function to all string values in a TOML value.
fn visit_string_values<F>(value: &mut toml::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		toml::Value::Boolean(_) => (),
		toml::Value::Integer(_) => (),
		toml::Value::Float(_) => (),
		toml::Value::Datetime(_) => (),
		toml::Value::String(val) => fun(val),
		toml::Value::Array(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		toml::Value::Table(map) => {
			for (_key, value) in map.iter_mut() {
				visit_string_values(value, fun);
			}
		},
	}
}
