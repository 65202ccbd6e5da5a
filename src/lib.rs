//! Placeholder substitution for generated module sources.
//!
//! Build pipelines often emit sources with placeholder tokens like `ICON_FONT(home)`,
//! to be filled in once the real content is known.
//! This crate finds those tokens with a [`TokenPattern`], looks up their argument in a [`DataMap`],
//! and either substitutes them outright or produces range edits that compose with other pending edits.
//!
//! # Features
//!
//! * Substitute placeholders in a `&str` or a `&[u8]`.
//! * Produce non-overlapping [`MatchRange`] edits instead of a new string, and collect them in a [`PatchSet`].
//! * Unresolved placeholders are never an error: they are left in place.
//! * Process whole build passes with the [`pipeline`] module.
//! * Name emitted files after a hash of their content with the [`hash`] module.
//! * Resolve placeholders in all string values of JSON, TOML or YAML documents (optional features).
//!
//! # Examples
//!
//! The [`resolve_to_string()`] function substitutes every resolvable placeholder in a string.
//!
//! ```
//! # fn main() -> Result<(), replace_holder::Error> {
//! use replace_holder::TokenPattern;
//!
//! let pattern = TokenPattern::call("ICON")?;
//! let data = [("home", "\u{e001}")];
//! assert_eq!(replace_holder::resolve_to_string("ICON(home) ICON(close)", &pattern, &data), "\u{e001} ICON(close)");
//! # Ok(())
//! # }
//! ```
//!
//! The [`resolve_to_ranges()`] function leaves the source alone and returns the edits to apply.
//!
//! ```
//! # fn main() -> Result<(), replace_holder::Error> {
//! use replace_holder::{apply_ranges, MatchRange, TokenPattern};
//!
//! let pattern = TokenPattern::new(r"A\(([^)]*)\)")?;
//! let data = [("1", "X"), ("2", "Y")];
//! let ranges = replace_holder::resolve_to_ranges("A(1)_A(1)_A(2)", &pattern, &data);
//! assert_eq!(ranges, [
//!   MatchRange::new(0, 3, "X"),
//!   MatchRange::new(5, 8, "X"),
//!   MatchRange::new(10, 13, "Y"),
//! ]);
//! assert_eq!(apply_ranges("A(1)_A(1)_A(2)", &ranges)?, "X_X_Y");
//! # Ok(())
//! # }
//! ```
//!
//! Byte buffers are decoded as UTF-8 with [`resolve_bytes()`].
//!
//! ```
//! # fn main() -> Result<(), replace_holder::Error> {
//! # use replace_holder::TokenPattern;
//! let pattern = TokenPattern::call("ICON")?;
//! let data = [("home", "H")];
//! assert_eq!(replace_holder::resolve_bytes(b"<ICON(home)>", &pattern, &data)?, b"<H>");
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(feature = "doc-cfg", feature(doc_cfg))]

pub mod error;
pub use error::Error;

pub mod map;
pub use map::*;

mod pattern;
pub use pattern::*;

mod range;
pub use range::*;

mod template;
pub use template::*;

pub mod hash;
pub mod output;
pub mod pipeline;
pub mod source;

mod features;
#[allow(unused_imports)]
pub use features::*;

/// Substitute placeholders in a string.
///
/// Every match of `pattern` whose argument has a non-empty [`content()`][ReplacementValue::content] in `data`
/// is replaced by that content.
/// Placeholders without a value are kept verbatim.
///
/// You can pass a [`HashMap`][std::collections::HashMap], [`BTreeMap`][std::collections::BTreeMap],
/// a slice of key-value pairs or any other [`DataMap`] as the `data` parameter.
/// The values can be [`Replacement`]s or plain strings.
pub fn resolve_to_string<'a, M>(source: &str, pattern: &TokenPattern, data: &'a M) -> String
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	Template::scan(source, pattern).resolve_to_string(data)
}

/// Compute range edits for the placeholders in a string.
///
/// Each distinct placeholder literal with a non-empty [`escaped_content()`][ReplacementValue::escaped_content] in `data`
/// produces one [`MatchRange`] for every occurrence of that literal in the source.
///
/// The ranges are sorted by offset and do not overlap.
/// Their offsets refer to `source` as given: apply them to the unmodified source only.
pub fn resolve_to_ranges<'a, M>(source: &str, pattern: &TokenPattern, data: &'a M) -> Vec<MatchRange>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	Template::scan(source, pattern).resolve_to_ranges(data)
}

/// Substitute placeholders in a byte buffer.
///
/// The buffer is decoded as UTF-8 and processed like [`resolve_to_string()`].
/// Bytes outside of the replaced placeholders are returned unchanged.
///
/// Returns an [`Error::InvalidEncoding`] if the buffer is not valid UTF-8.
pub fn resolve_bytes<'a, M>(source: &[u8], pattern: &TokenPattern, data: &'a M) -> Result<Vec<u8>, Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	Ok(Template::from_bytes(source, pattern)?.resolve_to_string(data).into_bytes())
}

/// Compute range edits for the placeholders in a byte buffer.
///
/// The buffer is decoded as UTF-8 and processed like [`resolve_to_ranges()`].
/// The offsets of the returned ranges are byte offsets into `source`.
///
/// Returns an [`Error::InvalidEncoding`] if the buffer is not valid UTF-8.
pub fn resolve_bytes_to_ranges<'a, M>(source: &[u8], pattern: &TokenPattern, data: &'a M) -> Result<Vec<MatchRange>, Error>
where
	M: DataMap<'a> + ?Sized,
	M::Value: ReplacementValue,
{
	Ok(Template::from_bytes(source, pattern)?.resolve_to_ranges(data))
}

#[cfg(test)]
mod test {
	use std::collections::{BTreeMap, HashMap};

	use super::*;
	use assert2::{assert, check, let_assert};

	fn pattern() -> TokenPattern {
		TokenPattern::new(r"PLACEHOLDER\(([^)]*)\)").unwrap()
	}

	#[test]
	fn test_resolve_to_string() {
		let mut data: BTreeMap<String, String> = BTreeMap::new();
		data.insert("name".into(), "world".into());
		check!(resolve_to_string("Hello PLACEHOLDER(name)!", &pattern(), &data) == "Hello world!");

		let mut data: HashMap<&str, Replacement> = HashMap::new();
		data.insert("name", Replacement::new("world", "w\\6f rld"));
		check!(resolve_to_string("Hello PLACEHOLDER(name)!", &pattern(), &data) == "Hello world!");
	}

	#[test]
	fn test_unknown_key_is_kept() {
		let data: BTreeMap<String, String> = BTreeMap::new();
		assert!(resolve_to_string("PLACEHOLDER(x)", &pattern(), &data) == "PLACEHOLDER(x)");
		assert!(resolve_to_ranges("PLACEHOLDER(x)", &pattern(), &data).is_empty());
		assert!(resolve_to_string("PLACEHOLDER(x)", &pattern(), &NoData) == "PLACEHOLDER(x)");
	}

	#[test]
	fn test_resolve_to_string_is_idempotent() {
		let data = [("a", "alpha"), ("b", "beta")];
		let source = "PLACEHOLDER(a) and PLACEHOLDER(b), PLACEHOLDER(a) again";
		let once = resolve_to_string(source, &pattern(), &data);
		let twice = resolve_to_string(&once, &pattern(), &data);
		assert!(once == "alpha and beta, alpha again");
		assert!(once == twice);
	}

	#[test]
	fn test_scanning_continues_after_unresolved() {
		let data = [("b", "beta")];
		let source = "PLACEHOLDER(a)PLACEHOLDER(b)PLACEHOLDER(a)PLACEHOLDER(b)";
		assert!(resolve_to_string(source, &pattern(), &data) == "PLACEHOLDER(a)betaPLACEHOLDER(a)beta");
	}

	#[test]
	fn test_ranges_use_escaped_content() {
		let mut data = BTreeMap::new();
		data.insert("q", Replacement::new("\"", "\\\""));
		let source = "content: 'PLACEHOLDER(q)'";
		let ranges = resolve_to_ranges(source, &pattern(), &data);
		assert!(ranges == [MatchRange::new(10, 23, "\\\"")]);
		assert!(resolve_to_string(source, &pattern(), &data) == "content: '\"'");
	}

	#[test]
	fn test_dedup_by_literal_not_key() {
		// Both spellings resolve to key `1`, but they are different literals.
		let pattern = TokenPattern::new(r"A\(\s*(\d+)\s*\)").unwrap();
		let data = [("1", "X")];
		let source = "A(1)_A( 1 )_A(1)_A( 1 )";
		let ranges = resolve_to_ranges(source, &pattern, &data);
		assert!(ranges == [
			MatchRange::new(0, 3, "X"),
			MatchRange::new(5, 10, "X"),
			MatchRange::new(12, 15, "X"),
			MatchRange::new(17, 22, "X"),
		]);
		let_assert!(Ok(applied) = apply_ranges(source, &ranges));
		assert!(applied == "X_X_X_X");
	}

	#[test]
	fn test_string_and_range_modes_agree() {
		let data = [("name", "world"), ("greeting", "Hello")];
		let sources = [
			"PLACEHOLDER(greeting) PLACEHOLDER(name)!",
			"no placeholders at all",
			"PLACEHOLDER(unknown) PLACEHOLDER(name) PLACEHOLDER(name)",
			"❤PLACEHOLDER(name)❤PLACEHOLDER()",
			"",
		];
		for source in sources {
			let ranges = resolve_to_ranges(source, &pattern(), &data);
			let_assert!(Ok(applied) = apply_ranges(source, &ranges));
			check!(applied == resolve_to_string(source, &pattern(), &data), "source: {source:?}");
		}
	}

	#[test]
	fn test_resolve_bytes() {
		let data = [("name", "world")];
		let source = b"\x00\x01Hello PLACEHOLDER(name)!\x7f";
		let_assert!(Ok(resolved) = resolve_bytes(source, &pattern(), &data));
		assert!(resolved == b"\x00\x01Hello world!\x7f");

		let_assert!(Ok(ranges) = resolve_bytes_to_ranges(source, &pattern(), &data));
		assert!(ranges == [MatchRange::new(8, 24, "world")]);
	}

	#[test]
	fn test_resolve_bytes_invalid_encoding() {
		let data = [("name", "world")];
		let source = b"PLACEHOLDER(name)\xFF";
		let_assert!(Err(Error::InvalidEncoding(e)) = resolve_bytes(source, &pattern(), &data));
		assert!(e.position == 17);
		assert!(e.len == Some(1));
		let_assert!(Err(Error::InvalidEncoding(_)) = resolve_bytes_to_ranges(source, &pattern(), &data));
	}

	#[test]
	fn test_dyn_data_map() {
		let mut data = BTreeMap::new();
		data.insert(String::from("aap"), String::from("noot"));
		let data: &dyn DataMap<Value = &String> = &data;
		assert!(resolve_to_string("one PLACEHOLDER(aap)", &pattern(), data) == "one noot");
	}

	#[test]
	fn test_combinators() {
		let pass = [("a", "from pass")];
		let defaults = [("a", "default"), ("b", "default")];
		let data = fallback(pass, defaults);
		assert!(resolve_to_string("PLACEHOLDER(a) PLACEHOLDER(b)", &pattern(), &data) == "from pass default");

		let data = map_value([("a", "x")], |value| value.to_uppercase());
		assert!(resolve_to_string("PLACEHOLDER(a)", &pattern(), &data) == "X");

		let data = from_fn(|key| (key == "a").then(|| Replacement::plain("y")));
		assert!(resolve_to_string("PLACEHOLDER(a)", &pattern(), &data) == "y");
	}
}
