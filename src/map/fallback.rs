use super::DataMap;

/// [`DataMap`] produced by [`fallback()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FallbackData<Base, Fallback> {
	base: Base,
	fallback: Fallback,
}

impl<'a, Value, Base, Fallback> DataMap<'a> for FallbackData<Base, Fallback>
where
	Base: DataMap<'a, Value = Value>,
	Fallback: DataMap<'a, Value = Value>,
{
	type Value = Value;

	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.base.get(key).or_else(|| self.fallback.get(key))
	}
}

/// Creates a [`DataMap`] that will first try to find values in `base`, and then attempt to
/// find values in `fallback`.
///
/// This is useful to layer data populated for one build pass over shared defaults.
///
/// # Example
/// ```rust
/// # use replace_holder::{fallback, DataMap};
///
/// let pass = [("home", "\u{e001}")];
/// let with_defaults = fallback(pass, [("missing", "\u{e000}")]);
///
/// assert_eq!(with_defaults.get("home"), Some(&"\u{e001}"));
/// assert_eq!(with_defaults.get("missing"), Some(&"\u{e000}"));
/// assert_eq!(with_defaults.get("close"), None);
/// ```
pub const fn fallback<Base, Fallback>(base: Base, fallback: Fallback) -> FallbackData<Base, Fallback> {
	FallbackData { base, fallback }
}
