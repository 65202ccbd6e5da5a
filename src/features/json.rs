//! Placeholder resolution in JSON documents.

use serde::de::DeserializeOwned;

use crate::{DataMap, ReplacementValue, TokenPattern};

/// Parse a struct from JSON data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`serde_json::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_slice<'a, T: DeserializeOwned, M>(data: &[u8], pattern: &TokenPattern, values: &'a M) -> Result<T, serde_json::Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	let mut value: serde_json::Value = serde_json::from_slice(data)?;
	resolve_string_values(&mut value, pattern, values);
	T::deserialize(value)
}

/// Parse a struct from JSON data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`serde_json::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_str<'a, T: DeserializeOwned, M>(data: &str, pattern: &TokenPattern, values: &'a M) -> Result<T, serde_json::Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	let mut value: serde_json::Value = serde_json::from_str(data)?;
	resolve_string_values(&mut value, pattern, values);
	T::deserialize(value)
}

/// Resolve placeholders in all string values of a JSON value.
///
/// Object keys are left alone.
pub fn resolve_string_values<'a, M>(value: &mut serde_json::Value, pattern: &TokenPattern, values: &'a M)
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	visit_string_values(value, |value| {
		*value = crate::resolve_to_string(value.as_str(), pattern, values);
	})
}

/// Recursively apply a function to all string values in a JSON value.
fn visit_string_values<F>(value: &mut serde_json::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		serde_json::Value::Null => (),
		serde_json::Value::Bool(_) => (),
		serde_json::Value::Number(_) => (),
		serde_json::Value::String(val) => fun(val),
		serde_json::Value::Array(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		serde_json::Value::Object(map) => {
			for value in map.values_mut() {
				visit_string_values(value, fun);
			}
		},
	}
}
