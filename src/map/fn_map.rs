use super::DataMap;

/// [`DataMap`] produced by [`from_fn()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FnMap<F> {
	func: F,
}

impl<'a, F, V> DataMap<'a> for FnMap<F>
where
	F: 'a + Fn(&str) -> Option<V>,
{
	type Value = V;

	#[inline(always)]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		(self.func)(key)
	}
}

/// Creates a [`DataMap`] that delegates to the given function.
///
/// # Example
/// ```rust
/// # use replace_holder::map::{from_fn, DataMap};
///
/// let codepoints = from_fn(|key| match key {
///     "home" => Some("\u{e001}"),
///     "search" => Some("\u{e002}"),
///     _ => None,
/// });
///
/// assert_eq!(codepoints.get("home"), Some("\u{e001}"));
/// assert_eq!(codepoints.get("close"), None);
/// ```
pub const fn from_fn<F, V>(func: F) -> FnMap<F>
where
	F: Fn(&str) -> Option<V>,
{
	FnMap { func }
}
