use serde::{
	de::{Error, Visitor},
	ser::SerializeStruct,
	Deserialize,
	Deserializer,
	Serialize,
	Serializer,
};

use crate::{Replacement, TokenPattern};

struct TokenPatternVisitor;

impl<'de> Visitor<'de> for TokenPatternVisitor {
	type Value = TokenPattern;

	fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
		formatter.write_str("a regular expression with a capture group")
	}

	fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
	where
		E: Error,
	{
		TokenPattern::new(v).map_err(E::custom)
	}
}

impl Serialize for TokenPattern {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for TokenPattern {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_str(TokenPatternVisitor)
	}
}

/// The accepted shapes of a replacement in data files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplacementRepr {
	/// A bare string, used for both representations.
	Plain(String),

	/// Separate raw and escaped content.
	Full {
		content: String,
		#[serde(rename = "escapedContent", default)]
		escaped_content: Option<String>,
	},
}

impl Serialize for Replacement {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut state = serializer.serialize_struct("Replacement", 2)?;
		state.serialize_field("content", &self.content)?;
		state.serialize_field("escapedContent", &self.escaped_content)?;
		state.end()
	}
}

impl<'de> Deserialize<'de> for Replacement {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		match ReplacementRepr::deserialize(deserializer)? {
			ReplacementRepr::Plain(content) => Ok(Replacement::plain(content)),
			ReplacementRepr::Full { content, escaped_content: None } => Ok(Replacement::plain(content)),
			ReplacementRepr::Full { content, escaped_content: Some(escaped_content) } => {
				Ok(Replacement::new(content, escaped_content))
			},
		}
	}
}

#[cfg(test)]
mod test {
	use serde_test::{assert_de_tokens_error, assert_ser_tokens, assert_tokens, Token};

	use crate::pipeline::ReplacerOptions;
	use crate::{Replacement, TokenPattern};

	const PATTERN: &str = r"ICON\(([^)]*)\)";

	#[test]
	fn token_pattern_ser_de() {
		let pattern = TokenPattern::new(PATTERN).unwrap();

		assert_tokens(&pattern, &[Token::Str(PATTERN)]);
	}

	#[test]
	fn token_pattern_rejects_invalid() {
		assert_de_tokens_error::<TokenPattern>(
			&[Token::Str("ICON")],
			"Invalid token pattern \"ICON\": the pattern needs a capture group for the placeholder argument",
		);
	}

	#[test]
	fn replacement_ser() {
		let replacement = Replacement::new("\u{e001}", "\\e001");

		assert_ser_tokens(&replacement, &[
			Token::Struct { name: "Replacement", len: 2 },
			Token::Str("content"),
			Token::Str("\u{e001}"),
			Token::Str("escapedContent"),
			Token::Str("\\e001"),
			Token::StructEnd,
		]);
	}

	#[test]
	fn options_ser_de() {
		let options = ReplacerOptions::default();

		assert_tokens(&options, &[
			Token::Struct { name: "ReplacerOptions", len: 6 },
			Token::Str("pattern"),
			Token::Str(TokenPattern::DEFAULT),
			Token::Str("moduleMark"),
			Token::None,
			Token::Str("styleIdentifier"),
			Token::Str(r"^css\s+"),
			Token::Str("output"),
			Token::Str("./"),
			Token::Str("filename"),
			Token::Str("[name].[ext]?[hash]"),
			Token::Str("publicPath"),
			Token::None,
			Token::StructEnd,
		]);
	}
}
