use indexmap::IndexMap;

use crate::DataMap;

impl<'a, V: 'a> DataMap<'a> for IndexMap<&str, V> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

impl<'a, V: 'a> DataMap<'a> for IndexMap<String, V> {
	type Value = &'a V;

	#[inline]
	fn get(&'a self, key: &str) -> Option<Self::Value> {
		self.get(key)
	}
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use indexmap::IndexMap;
	use assert2::check;

	use crate::{resolve_bytes, resolve_to_ranges, resolve_to_string, MatchRange, Replacement, TokenPattern};

	#[test]
	fn test_resolve_to_string() {
		let pattern = TokenPattern::call("ICON").unwrap();

		let mut data: IndexMap<String, String> = IndexMap::new();
		data.insert("home".into(), "H".into());
		check!(resolve_to_string("<ICON(home)>", &pattern, &data) == "<H>");

		let mut data: IndexMap<&str, Replacement> = IndexMap::new();
		data.insert("home", Replacement::new("H", "h"));
		check!(resolve_to_string("<ICON(home)>", &pattern, &data) == "<H>");
		check!(resolve_to_ranges("<ICON(home)>", &pattern, &data) == [MatchRange::new(1, 10, "h")]);
	}

	#[test]
	fn test_resolve_bytes() {
		let pattern = TokenPattern::call("ICON").unwrap();
		let mut data: IndexMap<&str, &str> = IndexMap::new();
		data.insert("home", "H");
		check!(let Ok(b"<H>") = resolve_bytes(b"<ICON(home)>", &pattern, &data).as_deref());
	}
}
