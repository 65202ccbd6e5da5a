//! Data maps and replacement values used to resolve placeholders.

use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

mod fallback;
pub use fallback::*;

mod fn_map;
pub use fn_map::*;

mod map_value;
pub use map_value::*;

/// Trait for types that can be used as a data map.
///
/// The key is the argument captured by the token pattern.
pub trait DataMap<'a> {
	/// The type returned by the [`get()`][Self::get] function.
	type Value;

	/// Get a value from the map.
	fn get(&'a self, key: &str) -> Option<Self::Value>;
}

/// Trait for values that can replace a placeholder.
///
/// A replacement has two representations:
/// the raw [`content()`][Self::content] used when a source is substituted outright,
/// and the [`escaped_content()`][Self::escaped_content] used for range edits on partially processed sources.
///
/// An empty representation means "no replacement": the placeholder is kept as it is.
pub trait ReplacementValue {
	/// The raw substitution text.
	fn content(&self) -> &str;

	/// The substitution text for range edits.
	///
	/// Defaults to [`Self::content()`].
	fn escaped_content(&self) -> &str {
		self.content()
	}
}

/// A replacement value with separate raw and escaped content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Replacement {
	/// The raw substitution text.
	pub content: String,

	/// The substitution text for range edits.
	pub escaped_content: String,
}

impl Replacement {
	/// Create a replacement with distinct raw and escaped content.
	pub fn new(content: impl Into<String>, escaped_content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			escaped_content: escaped_content.into(),
		}
	}

	/// Create a replacement that uses the same text for both representations.
	pub fn plain(content: impl Into<String>) -> Self {
		let content = content.into();
		Self {
			escaped_content: content.clone(),
			content,
		}
	}
}

impl From<&str> for Replacement {
	#[inline]
	fn from(other: &str) -> Self {
		Self::plain(other)
	}
}

impl From<String> for Replacement {
	#[inline]
	fn from(other: String) -> Self {
		Self::plain(other)
	}
}

impl ReplacementValue for Replacement {
	#[inline]
	fn content(&self) -> &str {
		&self.content
	}

	#[inline]
	fn escaped_content(&self) -> &str {
		&self.escaped_content
	}
}

impl ReplacementValue for str {
	#[inline]
	fn content(&self) -> &str {
		self
	}
}

impl ReplacementValue for String {
	#[inline]
	fn content(&self) -> &str {
		self
	}
}

impl ReplacementValue for Cow<'_, str> {
	#[inline]
	fn content(&self) -> &str {
		self
	}
}

impl<T: ?Sized + ReplacementValue> ReplacementValue for &'_ T {
	#[inline(always)]
	fn content(&self) -> &str {
		T::content(self)
	}

	#[inline(always)]
	fn escaped_content(&self) -> &str {
		T::escaped_content(self)
	}
}

impl<T: ?Sized + ReplacementValue> ReplacementValue for Box<T> {
	#[inline(always)]
	fn content(&self) -> &str {
		T::content(self)
	}

	#[inline(always)]
	fn escaped_content(&self) -> &str {
		T::escaped_content(self)
	}
}

/// A data map owning its keys and replacement values.
///
/// This is the usual shape of the data populated once per build pass.
pub type DataMapping = BTreeMap<String, Replacement>;

/// Allow using key-value [`slice`]s as [`DataMap`]s.
///
/// # Performance
///
/// For a few key-value pairs, where the keys and values are small,
/// this is should be reasonably performant.
///
/// However, for many numbers of key-value pairs, or when the keys or values are large,
/// you may get better performance from a [`HashMap`] or [`BTreeMap`].
///
/// # Example
/// ```rust
/// # use replace_holder::DataMap;
///
/// let icons = &[("home", "\u{e001}"), ("search", "\u{e002}")];
///
/// assert_eq!(icons.get("home"), Some(&"\u{e001}"));
/// assert_eq!(icons.get("close"), None);
/// ```
impl<'a, K, V> DataMap<'a> for [(K, V)]
where
	K: Borrow<str>,
	V: 'a,
{
	type Value = &'a V;

	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.iter().find_map(|(k, v)| (k.borrow() == key).then_some(v))
	}
}

/// Allow using key-value [`arrays`](`array`) as [`DataMap`]s.
///
/// Delegates to the implementation for [`slices`](`slice`).
impl<'a, K, V, const N: usize> DataMap<'a> for [(K, V); N]
where
	K: Borrow<str>,
	V: 'a,
{
	type Value = &'a V;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		DataMap::get(self.as_slice(), key)
	}
}

/// Allow using key-value [`Vec`]s as [`DataMap`]s.
///
/// Delegates to the implementation for [`slices`](`slice`).
impl<'a, K, V> DataMap<'a> for Vec<(K, V)>
where
	K: Borrow<str>,
	V: 'a,
{
	type Value = &'a V;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		DataMap::get(self.as_slice(), key)
	}
}

impl<'a, T> DataMap<'a> for &'_ T
where
	T: ?Sized + DataMap<'a>,
{
	type Value = <T as DataMap<'a>>::Value;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		T::get(self, key)
	}
}

impl<'a, T> DataMap<'a> for std::boxed::Box<T>
where
	T: ?Sized + DataMap<'a>,
{
	type Value = <T as DataMap<'a>>::Value;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		T::get(self, key)
	}
}

impl<'a, T> DataMap<'a> for std::rc::Rc<T>
where
	T: ?Sized + DataMap<'a>,
{
	type Value = <T as DataMap<'a>>::Value;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		T::get(self, key)
	}
}

impl<'a, T> DataMap<'a> for std::sync::Arc<T>
where
	T: ?Sized + DataMap<'a>,
{
	type Value = <T as DataMap<'a>>::Value;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		T::get(self, key)
	}
}

/// A "map" that never returns any values.
///
/// Resolving with this map leaves every placeholder in place.
#[derive(Debug)]
pub struct NoData;

impl<'a> DataMap<'a> for NoData {
	type Value = NeverValue;

	#[inline]
	fn get(&'a self, _key: &str) -> Option<Self::Value> {
		None
	}
}

/// Value returned by the [`NoData`] map.
#[derive(Debug)]
pub enum NeverValue {}

impl ReplacementValue for NeverValue {
	#[inline]
	fn content(&self) -> &str {
		match *self {}
	}
}

impl<'a, V: 'a> DataMap<'a> for BTreeMap<&str, V> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

impl<'a, V: 'a> DataMap<'a> for BTreeMap<String, V> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

impl<'a, V: 'a, S: BuildHasher> DataMap<'a> for HashMap<&str, V, S> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

impl<'a, V: 'a, S: BuildHasher> DataMap<'a> for HashMap<String, V, S> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::{assert, let_assert};

	#[test]
	fn test_replacement_representations() {
		let value = Replacement::new("a\"b", "a\\\"b");
		assert!(value.content() == "a\"b");
		assert!(value.escaped_content() == "a\\\"b");

		let value = Replacement::from("plain");
		assert!(value.content() == "plain");
		assert!(value.escaped_content() == "plain");

		assert!("text".escaped_content() == "text");
		assert!(String::from("text").escaped_content() == "text");
	}

	#[test]
	fn test_data_mapping() {
		let mut data = DataMapping::new();
		data.insert("home".into(), Replacement::new("\u{e001}", "\\e001"));
		let_assert!(Some(value) = DataMap::get(&data, "home"));
		assert!(value.escaped_content() == "\\e001");
		assert!(DataMap::get(&data, "close").is_none());
	}

	#[test]
	fn test_no_data() {
		assert!(NoData.get("anything").is_none());
	}

	#[test]
	fn test_dyn_data_map() {
		let mut data = HashMap::new();
		data.insert(String::from("aap"), String::from("noot"));
		let data: &dyn DataMap<Value = &String> = &data;
		let_assert!(Some(value) = data.get("aap"));
		assert!(value.content() == "noot");
	}
}
