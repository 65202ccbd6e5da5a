//! Placeholder resolution in YAML documents.

use serde::de::DeserializeOwned;

use crate::{DataMap, ReplacementValue, TokenPattern};

/// Parse a struct from YAML data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`serde_yaml::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_slice<'a, T: DeserializeOwned, M>(data: &[u8], pattern: &TokenPattern, values: &'a M) -> Result<T, serde_yaml::Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	let mut value: serde_yaml::Value = serde_yaml::from_slice(data)?;
	resolve_string_values(&mut value, pattern, values);
	serde_yaml::from_value(value)
}

/// Parse a struct from YAML data, after resolving placeholders in string values.
///
/// This function first parses the data into a [`serde_yaml::Value`],
/// then resolves placeholders in all string values,
/// and then parses it further into the desired type.
pub fn from_str<'a, T: DeserializeOwned, M>(data: &str, pattern: &TokenPattern, values: &'a M) -> Result<T, serde_yaml::Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	let mut value: serde_yaml::Value = serde_yaml::from_str(data)?;
	resolve_string_values(&mut value, pattern, values);
	serde_yaml::from_value(value)
}

/// Resolve placeholders in all string values of a YAML value.
///
/// Mapping keys are left alone.
pub fn resolve_string_values<'a, M>(value: &mut serde_yaml::Value, pattern: &TokenPattern, values: &'a M)
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	visit_string_values(value, |value| {
		*value = crate::resolve_to_string(value.as_str(), pattern, values);
	})
}

/// Recursively apply a function to all string values in a YAML value.
fn visit_string_values<F>(value: &mut serde_yaml::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		serde_yaml::Value::Null => (),
		serde_yaml::Value::Bool(_) => (),
		serde_yaml::Value::Number(_) => (),
		serde_yaml::Value::String(val) => fun(val),
		serde_yaml::Value::Tagged(tagged) => visit_string_values(&mut tagged.value, fun),
		serde_yaml::Value::Sequence(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		serde_yaml::Value::Mapping(map) => {
			for (_key, value) in map.iter_mut() {
				visit_string_values(value, fun);
			}
		},
	}
}
