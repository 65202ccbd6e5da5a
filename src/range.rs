use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{EmptyRange, Error, InvalidRange, OverlappingRange};

/// A pending edit on an original source text.
///
/// The offsets are byte offsets into the original source.
/// They stay valid only as long as that source is not modified,
/// so ranges should be applied with [`apply_ranges()`] or collected in a [`PatchSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchRange {
	start: usize,
	end: usize,
	replacement: String,
}

impl MatchRange {
	/// Create a new range from a start offset and an inclusive end offset.
	pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
		Self {
			start,
			end,
			replacement: replacement.into(),
		}
	}

	/// The offset of the first byte to replace.
	#[inline]
	pub fn start(&self) -> usize {
		self.start
	}

	/// The offset of the last byte to replace.
	#[inline]
	pub fn end(&self) -> usize {
		self.end
	}

	/// The text to insert in place of the range.
	#[inline]
	pub fn replacement(&self) -> &str {
		&self.replacement
	}

	/// The replaced bytes as a half-open range.
	#[inline]
	pub fn range(&self) -> Range<usize> {
		self.start..self.end.saturating_add(1)
	}

	/// Consume the range to get the replacement text.
	#[inline]
	pub fn into_replacement(self) -> String {
		self.replacement
	}
}

/// Apply range edits to a source and return the result.
///
/// The ranges may be given in any order, but they must not overlap,
/// they must lie within the source, and they must start and end on character boundaries.
pub fn apply_ranges(source: &str, ranges: &[MatchRange]) -> Result<String, Error> {
	let mut patches = PatchSet::new();
	patches.extend(ranges.iter().cloned())?;
	patches.apply(source)
}

/// A set of non-overlapping edits on one original source.
///
/// Several transforms can add edits to the same set without invalidating each other's offsets.
/// The original text is never modified: [`Self::apply()`] renders a new string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
	patches: BTreeMap<usize, MatchRange>,
}

impl PatchSet {
	/// Create an empty patch set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Get the number of edits in the set.
	#[inline]
	pub fn len(&self) -> usize {
		self.patches.len()
	}

	/// Check if the set holds no edits.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.patches.is_empty()
	}

	/// Iterate over the edits in the set, ordered by offset.
	pub fn iter(&self) -> impl Iterator<Item = &MatchRange> {
		self.patches.values()
	}

	/// Add an edit to the set.
	///
	/// Adding an edit that is already present has no effect,
	/// so repeating a transform over the same source is harmless.
	/// Adding an edit that overlaps a different edit fails with [`Error::OverlappingRange`],
	/// and an edit that ends before it starts fails with [`Error::EmptyRange`].
	pub fn insert(&mut self, range: MatchRange) -> Result<(), Error> {
		if range.end < range.start {
			return Err(EmptyRange {
				start: range.start,
				end: range.end,
			}
			.into());
		}

		let new = range.range();

		if let Some(existing) = self.patches.get(&range.start) {
			if *existing == range {
				return Ok(());
			}
			return Err(overlap(new, existing));
		}
		if let Some((_, before)) = self.patches.range(..range.start).next_back() {
			if before.range().end > new.start {
				return Err(overlap(new, before));
			}
		}
		if let Some((_, after)) = self.patches.range(range.start..).next() {
			if new.end > after.start {
				return Err(overlap(new, after));
			}
		}

		self.patches.insert(range.start, range);
		Ok(())
	}

	/// Add multiple edits to the set.
	///
	/// Stops at the first edit that can not be added.
	pub fn extend(&mut self, ranges: impl IntoIterator<Item = MatchRange>) -> Result<(), Error> {
		for range in ranges {
			self.insert(range)?;
		}
		Ok(())
	}

	/// Render the patched text of `source`.
	///
	/// `source` must be the original text the edits were computed for.
	pub fn apply(&self, source: &str) -> Result<String, Error> {
		let mut output = String::with_capacity(source.len());
		let mut finger = 0;
		for patch in self.patches.values() {
			let range = patch.range();
			if range.end > source.len() || !source.is_char_boundary(range.start) || !source.is_char_boundary(range.end) {
				return Err(InvalidRange {
					range,
					source_len: source.len(),
				}
				.into());
			}
			output.push_str(&source[finger..range.start]);
			output.push_str(patch.replacement());
			finger = range.end;
		}
		output.push_str(&source[finger..]);
		Ok(output)
	}
}

impl<'a> IntoIterator for &'a PatchSet {
	type Item = &'a MatchRange;
	type IntoIter = std::collections::btree_map::Values<'a, usize, MatchRange>;

	fn into_iter(self) -> Self::IntoIter {
		self.patches.values()
	}
}

fn overlap(range: Range<usize>, existing: &MatchRange) -> Error {
	OverlappingRange {
		range,
		existing: existing.range(),
	}
	.into()
}
