use super::DataMap;

/// [`DataMap`] produced by [`map_value()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MapData<M, F> {
	map: M,
	func: F,
}

impl<'a, M, F, V> DataMap<'a> for MapData<M, F>
where
	M: DataMap<'a>,
	F: Fn(M::Value) -> V,
{
	type Value = V;

	fn get(&'a self, key: &str) -> Option<Self::Value> {
		let value = self.map.get(key)?;
		Some((self.func)(value))
	}
}

/// Creates a [`DataMap`] that will apply a function `func` to values found in `map`.
///
/// # Example
/// ```rust
/// # use replace_holder::map::{map_value, DataMap, Replacement};
///
/// let glyphs = [("home", "\u{e001}")];
///
/// let escaped = map_value(glyphs, |glyph| {
///     Replacement::new(*glyph, format!("\\{:x}", glyph.chars().next().unwrap() as u32))
/// });
///
/// assert_eq!(escaped.get("home"), Some(Replacement::new("\u{e001}", "\\e001")));
/// assert_eq!(escaped.get("close"), None);
/// ```
pub const fn map_value<'a, M, F, V>(map: M, func: F) -> MapData<M, F>
where
	M: DataMap<'a>,
	F: Fn(M::Value) -> V,
{
	MapData { map, func }
}
