use regex::{Captures, Regex};

use crate::error::InvalidPattern;

/// Name of the capture group that holds the placeholder argument.
///
/// If a pattern has no group with this name, the first capture group is used instead.
pub const ARGUMENT_GROUP: &str = "arg";

/// A validated matcher for placeholder tokens.
///
/// Every match of the pattern is one placeholder occurrence.
/// The argument of the placeholder is taken from the capture group named `arg`,
/// or from the first capture group if there is no group with that name.
///
/// A pattern is validated once when it is constructed,
/// so resolving placeholders with it never fails because of the pattern itself.
#[derive(Clone)]
pub struct TokenPattern {
	regex: Regex,
	argument_group: usize,
}

impl std::fmt::Debug for TokenPattern {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("TokenPattern").field(&self.regex.as_str()).finish()
	}
}

impl TokenPattern {
	/// The pattern used when no pattern is configured: `PLACEHOLDER(argument)`.
	pub const DEFAULT: &'static str = r"PLACEHOLDER\(([^)]*)\)";

	/// Compile a token pattern from a regular expression.
	///
	/// The expression must have at least one capture group for the argument,
	/// and it must not match the empty string.
	pub fn new(pattern: &str) -> Result<Self, InvalidPattern> {
		let regex = Regex::new(pattern).map_err(|e| InvalidPattern {
			pattern: pattern.to_owned(),
			message: e.to_string(),
		})?;
		Self::from_regex(regex)
	}

	/// Use an already compiled regular expression as token pattern.
	///
	/// The same restrictions apply as for [`Self::new()`].
	pub fn from_regex(regex: Regex) -> Result<Self, InvalidPattern> {
		let invalid = |message: &str| InvalidPattern {
			pattern: regex.as_str().to_owned(),
			message: message.to_owned(),
		};

		let argument_group = match regex.capture_names().position(|name| name == Some(ARGUMENT_GROUP)) {
			Some(index) => index,
			None if regex.captures_len() > 1 => 1,
			None => return Err(invalid("the pattern needs a capture group for the placeholder argument")),
		};

		if regex.is_match("") {
			return Err(invalid("the pattern matches the empty string"));
		}

		Ok(Self { regex, argument_group })
	}

	/// Create a pattern for function-like tokens: `NAME(argument)`.
	///
	/// The name is matched literally.
	/// The argument is everything up to the first closing parenthesis.
	pub fn call(name: &str) -> Result<Self, InvalidPattern> {
		if name.is_empty() {
			return Err(InvalidPattern {
				pattern: String::new(),
				message: "the token name is empty".into(),
			});
		}
		Self::new(&format!(r"{}\((?P<{}>[^)]*)\)", regex::escape(name), ARGUMENT_GROUP))
	}

	/// Create a pattern for bare delimited markers, like `[argument]` or `{{argument}}`.
	///
	/// Both delimiters are matched literally.
	/// The argument can not be empty and can not contain the first character of the closing delimiter.
	pub fn delimited(open: &str, close: &str) -> Result<Self, InvalidPattern> {
		let Some(stop) = close.chars().next() else {
			return Err(InvalidPattern {
				pattern: open.to_owned(),
				message: "the closing delimiter is empty".into(),
			});
		};
		let mut stop_class = [0; 4];
		let stop_class = regex::escape(stop.encode_utf8(&mut stop_class));
		Self::new(&format!(
			r"{}(?P<{}>[^{}]+){}",
			regex::escape(open),
			ARGUMENT_GROUP,
			stop_class,
			regex::escape(close),
		))
	}

	/// Get the source of the regular expression.
	#[inline]
	pub fn as_str(&self) -> &str {
		self.regex.as_str()
	}

	/// Get the compiled regular expression.
	#[inline]
	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Iterate over all non-empty, non-overlapping matches in `source`.
	pub(crate) fn scan<'s>(&'s self, source: &'s str) -> impl Iterator<Item = Captures<'s>> + 's {
		self.regex
			.captures_iter(source)
			.filter(|captures| captures.get(0).is_some_and(|m| !m.is_empty()))
	}

	/// Get the byte range of the argument in a match, if the argument group participated.
	pub(crate) fn argument(&self, captures: &Captures<'_>) -> Option<std::ops::Range<usize>> {
		captures.get(self.argument_group).map(|m| m.range())
	}
}

impl Default for TokenPattern {
	fn default() -> Self {
		// The default pattern is a constant known to be valid.
		match Self::new(Self::DEFAULT) {
			Ok(pattern) => pattern,
			Err(e) => unreachable!("{e}"),
		}
	}
}

impl std::str::FromStr for TokenPattern {
	type Err = InvalidPattern;

	#[inline]
	fn from_str(pattern: &str) -> Result<Self, Self::Err> {
		Self::new(pattern)
	}
}

impl PartialEq for TokenPattern {
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.as_str() == other.as_str()
	}
}

impl Eq for TokenPattern {}
