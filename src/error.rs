//! Module containing error details.

use std::ops::Range;

/// An error that can occur while configuring or applying placeholder replacement.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub enum Error {
	/// The token pattern could not be compiled or can not capture an argument.
	InvalidPattern(InvalidPattern),

	/// A byte source is not valid UTF-8.
	InvalidEncoding(InvalidEncoding),

	/// Two edits for the same source overlap.
	OverlappingRange(OverlappingRange),

	/// An edit lies outside the source or splits a character.
	InvalidRange(InvalidRange),

	/// An edit ends before it starts.
	EmptyRange(EmptyRange),

	/// A file name template asks for a hash that is not supported.
	UnsupportedHash(UnsupportedHash),
}

impl From<InvalidPattern> for Error {
	#[inline]
	fn from(other: InvalidPattern) -> Self {
		Self::InvalidPattern(other)
	}
}

impl From<InvalidEncoding> for Error {
	#[inline]
	fn from(other: InvalidEncoding) -> Self {
		Self::InvalidEncoding(other)
	}
}

impl From<OverlappingRange> for Error {
	#[inline]
	fn from(other: OverlappingRange) -> Self {
		Self::OverlappingRange(other)
	}
}

impl From<InvalidRange> for Error {
	#[inline]
	fn from(other: InvalidRange) -> Self {
		Self::InvalidRange(other)
	}
}

impl From<EmptyRange> for Error {
	#[inline]
	fn from(other: EmptyRange) -> Self {
		Self::EmptyRange(other)
	}
}

impl From<UnsupportedHash> for Error {
	#[inline]
	fn from(other: UnsupportedHash) -> Self {
		Self::UnsupportedHash(other)
	}
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::InvalidPattern(e) => e.fmt(f),
			Self::InvalidEncoding(e) => e.fmt(f),
			Self::OverlappingRange(e) => e.fmt(f),
			Self::InvalidRange(e) => e.fmt(f),
			Self::EmptyRange(e) => e.fmt(f),
			Self::UnsupportedHash(e) => e.fmt(f),
		}
	}
}

/// The token pattern could not be compiled or can not capture an argument.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct InvalidPattern {
	/// The pattern as given by the caller.
	pub pattern: String,

	/// A human readable description of the problem.
	pub message: String,
}

impl std::error::Error for InvalidPattern {}

impl std::fmt::Display for InvalidPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Invalid token pattern {:?}: {}", self.pattern, self.message)
	}
}

/// A byte source is not valid UTF-8.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct InvalidEncoding {
	/// The byte offset of the first invalid byte.
	pub position: usize,

	/// The length of the invalid sequence in bytes.
	///
	/// `None` if the source ends in the middle of a multi-byte sequence.
	pub len: Option<usize>,
}

impl InvalidEncoding {
	pub(crate) fn from_utf8_error(error: std::str::Utf8Error) -> Self {
		Self {
			position: error.valid_up_to(),
			len: error.error_len(),
		}
	}
}

impl std::error::Error for InvalidEncoding {}

impl std::fmt::Display for InvalidEncoding {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.len {
			Some(_) => write!(f, "Invalid UTF-8 sequence at byte {}", self.position),
			None => write!(f, "Incomplete UTF-8 sequence at byte {}", self.position),
		}
	}
}

/// Two edits for the same source overlap.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct OverlappingRange {
	/// The byte range of the rejected edit.
	pub range: Range<usize>,

	/// The byte range of the edit that was already present.
	pub existing: Range<usize>,
}

impl std::error::Error for OverlappingRange {}

impl std::fmt::Display for OverlappingRange {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"Edit at {}..{} overlaps existing edit at {}..{}",
			self.range.start, self.range.end, self.existing.start, self.existing.end,
		)
	}
}

/// An edit lies outside the source or splits a character.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct InvalidRange {
	/// The byte range of the rejected edit.
	pub range: Range<usize>,

	/// The length of the source in bytes.
	pub source_len: usize,
}

impl std::error::Error for InvalidRange {}

impl std::fmt::Display for InvalidRange {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		if self.range.end > self.source_len {
			write!(
				f,
				"Edit at {}..{} is out of bounds for a source of {} bytes",
				self.range.start, self.range.end, self.source_len,
			)
		} else {
			write!(f, "Edit at {}..{} does not fall on character boundaries", self.range.start, self.range.end)
		}
	}
}

/// An edit ends before it starts, so it does not cover a single byte.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct EmptyRange {
	/// The offset of the first byte of the edit.
	pub start: usize,

	/// The inclusive end offset of the edit.
	pub end: usize,
}

impl std::error::Error for EmptyRange {}

impl std::fmt::Display for EmptyRange {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Edit at {}..={} is empty: it ends before it starts", self.start, self.end)
	}
}

/// A file name template asks for a hash algorithm or encoding that is not supported.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct UnsupportedHash {
	/// The hash token, or the part of it that is not supported.
	pub token: String,

	/// Why the hash is not supported.
	pub message: String,
}

impl std::error::Error for UnsupportedHash {}

impl std::fmt::Display for UnsupportedHash {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Unsupported hash {:?}: {}", self.token, self.message)
	}
}

impl Error {
	/// Get the range in the source text that contains the error.
	///
	/// Returns `None` for errors that do not point into a source text, like [`InvalidPattern`].
	pub fn source_range(&self) -> Option<Range<usize>> {
		match self {
			Self::InvalidPattern(_) => None,
			Self::InvalidEncoding(e) => {
				Some(e.position..e.position + e.len.unwrap_or(1))
			},
			Self::OverlappingRange(e) => Some(e.range.clone()),
			Self::InvalidRange(e) => {
				let end = e.range.end.min(e.source_len);
				Some(e.range.start.min(end)..end)
			},
			Self::EmptyRange(_) => None,
			Self::UnsupportedHash(_) => None,
		}
	}

	/// Get the line of source that contains the error.
	///
	/// Returns `None` for errors that do not point into a source text.
	///
	/// # Panics
	/// May panic if the source text is not the original source that contains the error.
	pub fn source_line<'a>(&self, source: &'a [u8]) -> Option<&'a [u8]> {
		let position = self.source_range()?.start;
		let start = line_start(source, position);
		let end = line_end(source, position);
		Some(&source[start..end])
	}

	/// Write source highlighting for the error location.
	///
	/// The highlighting ends with a newline.
	///
	/// Note: this function doesn't print anything if the error has no source location,
	/// if the source line is not valid UTF-8, or if the line exceeds 60 characters in width.
	pub fn write_source_highlighting(&self, f: &mut impl std::fmt::Write, source: &[u8]) -> std::fmt::Result {
		use unicode_width::UnicodeWidthStr;

		let (Some(range), Some(line)) = (self.source_range(), self.source_line(source)) else {
			return Ok(());
		};
		let line_start = line_start(source, range.start);
		let Ok(line) = std::str::from_utf8(line) else {
			return Ok(());
		};
		if line.width() > 60 {
			return Ok(());
		}
		let end = (range.end - line_start).min(line.len());
		let range = range.start - line_start..end;
		if !line.is_char_boundary(range.start) || !line.is_char_boundary(range.end) {
			return Ok(());
		}
		write!(f, "  {}\n  ", line)?;
		write_underline(f, line, range)?;
		writeln!(f)
	}

	/// Get source highlighting for the error location as a string.
	///
	/// The highlighting ends with a newline, or is empty if there is nothing to highlight.
	pub fn source_highlighting(&self, source: &[u8]) -> String {
		let mut output = String::new();
		// Writing to a String never fails.
		let _ = self.write_source_highlighting(&mut output, source);
		output
	}
}

fn line_start(source: &[u8], position: usize) -> usize {
	let position = position.min(source.len());
	match source[..position].iter().rposition(|&c| c == b'\n' || c == b'\r') {
		Some(line_end) => line_end + 1,
		None => 0,
	}
}

fn line_end(source: &[u8], position: usize) -> usize {
	let position = position.min(source.len());
	match source[position..].iter().position(|&c| c == b'\n' || c == b'\r') {
		Some(line_end) => position + line_end,
		None => source.len(),
	}
}

fn write_underline(f: &mut impl std::fmt::Write, line: &str, range: Range<usize>) -> std::fmt::Result {
	use unicode_width::UnicodeWidthStr;
	let spaces = line[..range.start].width();
	let carets = line[range].width().max(1);
	write!(f, "{}", " ".repeat(spaces))?;
	write!(f, "{}", "^".repeat(carets))?;
	Ok(())
}
