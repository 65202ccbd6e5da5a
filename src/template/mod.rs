use std::collections::HashSet;
use std::ops::Range;

use crate::error::{Error, InvalidEncoding};
use crate::{DataMap, MatchRange, ReplacementValue, TokenPattern};

/// A scanned source that borrows the source string.
///
/// Scanning finds all placeholders in the source once.
/// You can then call [`Self::resolve_to_string()`] or [`Self::resolve_to_ranges()`] multiple times,
/// for example with the data of different build passes.
/// This is generally more efficient than calling [`resolve_to_string()`][crate::resolve_to_string] multiple times on the same source.
#[derive(Clone)]
pub struct Template<'a> {
	source: &'a str,
	placeholders: Vec<Placeholder>,
}

/// One placeholder occurrence found while scanning.
#[derive(Debug, Clone)]
struct Placeholder {
	/// The range of the whole match in the source.
	range: Range<usize>,

	/// The range of the captured argument in the source.
	///
	/// `None` if the argument group did not participate in the match.
	argument: Option<Range<usize>>,
}

impl std::fmt::Debug for Template<'_> {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Template").field(&self.source).finish()
	}
}

impl<'a> Template<'a> {
	/// Scan a source string for all placeholders matching `pattern`.
	///
	/// Matches are found left to right and never overlap.
	pub fn scan(source: &'a str, pattern: &TokenPattern) -> Self {
		let placeholders = pattern
			.scan(source)
			.filter_map(|captures| {
				let range = captures.get(0)?.range();
				let argument = pattern.argument(&captures);
				Some(Placeholder { range, argument })
			})
			.collect();
		Self { source, placeholders }
	}

	/// Decode a byte source as UTF-8 and scan it for all placeholders matching `pattern`.
	///
	/// Returns an [`Error::InvalidEncoding`] if the source is not valid UTF-8.
	pub fn from_bytes(source: &'a [u8], pattern: &TokenPattern) -> Result<Self, Error> {
		let source = std::str::from_utf8(source).map_err(InvalidEncoding::from_utf8_error)?;
		Ok(Self::scan(source, pattern))
	}

	/// Get the original source string.
	#[inline]
	pub fn source(&self) -> &'a str {
		self.source
	}

	/// Get the number of placeholder occurrences in the source.
	#[inline]
	pub fn placeholder_count(&self) -> usize {
		self.placeholders.len()
	}

	/// Iterate over the literal text of all placeholder occurrences, in source order.
	pub fn literals(&self) -> impl Iterator<Item = &'a str> + '_ {
		self.placeholders.iter().map(|x| &self.source[x.range.clone()])
	}

	/// Resolve all placeholders and return the substituted string.
	///
	/// Every placeholder with a non-empty [`content()`][ReplacementValue::content] in `data` is replaced by that content.
	/// All other placeholders are kept verbatim.
	pub fn resolve_to_string<'b, M>(&self, data: &'b M) -> String
	where
		M: DataMap<'b> + ?Sized,
		M::Value: ReplacementValue,
	{
		let mut output = String::with_capacity(self.source.len() + self.source.len() / 10);
		let mut finger = 0;
		for placeholder in &self.placeholders {
			output.push_str(&self.source[finger..placeholder.range.start]);
			match self.lookup(placeholder, data) {
				Some(value) if !value.content().is_empty() => output.push_str(value.content()),
				_ => output.push_str(&self.source[placeholder.range.clone()]),
			}
			finger = placeholder.range.end;
		}
		output.push_str(&self.source[finger..]);
		output
	}

	/// Resolve all placeholders into range edits on the original source.
	///
	/// Each distinct literal placeholder text is resolved once.
	/// If it has a non-empty [`escaped_content()`][ReplacementValue::escaped_content] in `data`,
	/// every occurrence of that literal in the source produces a [`MatchRange`].
	///
	/// The returned ranges are sorted by offset and never overlap.
	pub fn resolve_to_ranges<'b, M>(&self, data: &'b M) -> Vec<MatchRange>
	where
		M: DataMap<'b> + ?Sized,
		M::Value: ReplacementValue,
	{
		let mut seen = HashSet::new();
		let mut ranges = Vec::new();
		for placeholder in &self.placeholders {
			let literal = &self.source[placeholder.range.clone()];
			if !seen.insert(literal) {
				continue;
			}
			let Some(value) = self.lookup(placeholder, data) else {
				continue;
			};
			let replacement = value.escaped_content();
			if replacement.is_empty() {
				continue;
			}

			let before = ranges.len();
			for start in memchr::memmem::find_iter(self.source.as_bytes(), literal) {
				ranges.push(MatchRange::new(start, start + literal.len() - 1, replacement));
			}
			tracing::trace!(literal, occurrences = ranges.len() - before, "resolved placeholder");
		}
		merge_non_overlapping(ranges)
	}

	/// Look up the argument of a placeholder in the data map.
	fn lookup<'b, M>(&self, placeholder: &Placeholder, data: &'b M) -> Option<M::Value>
	where
		M: DataMap<'b> + ?Sized,
	{
		let argument = placeholder.argument.clone()?;
		data.get(&self.source[argument])
	}
}

/// Sort ranges by offset and drop ranges that overlap an earlier one.
///
/// Literal searches for different placeholders can find overlapping occurrences.
/// The range that starts first wins, and of two ranges with the same start the longer one wins.
fn merge_non_overlapping(mut ranges: Vec<MatchRange>) -> Vec<MatchRange> {
	ranges.sort_by(|a, b| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));
	let mut next_free = 0;
	ranges.retain(|range| {
		if range.start() < next_free {
			tracing::trace!(start = range.start(), end = range.end(), "dropped overlapping range");
			return false;
		}
		next_free = range.end() + 1;
		true
	});
	ranges
}
