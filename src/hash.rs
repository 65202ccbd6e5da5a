//! Content hashes for the names of emitted files.
//!
//! A file name template can contain hash tokens of the form `[<algorithm>:hash:<encoding>:<length>]`,
//! where every part except `hash` is optional: `[hash]`, `[sha256:hash]`, `[hash:base62:8]`, ...

use std::ops::Range;

use md5::Md5;
use regex::Regex;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{Error, InvalidPattern, UnsupportedHash};

/// Matches hash tokens in a file name template.
const HASH_TOKEN: &str = r"(?i)\[(?:(\w+):)?hash(?::([a-z]+\d*))?(?::(\d+))?\]";

/// A hash algorithm for file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
	/// MD5, the default.
	#[default]
	Md5,

	/// SHA-1.
	Sha1,

	/// SHA-256.
	Sha256,

	/// SHA-512.
	Sha512,
}

impl HashAlgorithm {
	/// Hash the content.
	pub fn hash(self, content: &[u8]) -> Vec<u8> {
		match self {
			Self::Md5 => Md5::digest(content).to_vec(),
			Self::Sha1 => Sha1::digest(content).to_vec(),
			Self::Sha256 => Sha256::digest(content).to_vec(),
			Self::Sha512 => Sha512::digest(content).to_vec(),
		}
	}
}

impl std::str::FromStr for HashAlgorithm {
	type Err = UnsupportedHash;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name.to_ascii_lowercase().as_str() {
			"md5" => Ok(Self::Md5),
			"sha1" => Ok(Self::Sha1),
			"sha256" => Ok(Self::Sha256),
			"sha512" => Ok(Self::Sha512),
			_ => Err(UnsupportedHash {
				token: name.to_owned(),
				message: "unknown hash algorithm".into(),
			}),
		}
	}
}

/// How a hash is written in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestEncoding {
	/// Lowercase hexadecimal, the default.
	#[default]
	Hex,

	/// The hash read as a little endian number, written with the digits of a [`BaseAlphabet`].
	Base(BaseAlphabet),
}

/// The digit sets of [`DigestEncoding::Base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseAlphabet {
	/// Lowercase letters.
	Base26,
	/// Digits and lowercase letters without `0`, `i`, `l`, `o`.
	Base32,
	/// Digits and lowercase letters.
	Base36,
	/// Letters without `l`, `I`, `O`.
	Base49,
	/// Letters.
	Base52,
	/// Digits and letters without `0`, `l`, `I`, `O`.
	Base58,
	/// Digits and letters.
	Base62,
	/// Digits, letters, `-` and `_`.
	Base64,
}

impl BaseAlphabet {
	/// Get the digits, from zero upwards.
	pub fn digits(self) -> &'static [u8] {
		match self {
			Self::Base26 => b"abcdefghijklmnopqrstuvwxyz",
			Self::Base32 => b"123456789abcdefghjkmnpqrstuvwxyz",
			Self::Base36 => b"0123456789abcdefghijklmnopqrstuvwxyz",
			Self::Base49 => b"abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ",
			Self::Base52 => b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
			Self::Base58 => b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ",
			Self::Base62 => b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
			Self::Base64 => b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-_",
		}
	}
}

impl DigestEncoding {
	/// Encode a hash.
	pub fn encode(self, hash: &[u8]) -> String {
		match self {
			Self::Hex => hex::encode(hash),
			Self::Base(alphabet) => encode_base(hash, alphabet.digits()),
		}
	}
}

impl std::str::FromStr for DigestEncoding {
	type Err = UnsupportedHash;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		let alphabet = match name.to_ascii_lowercase().as_str() {
			"hex" => return Ok(Self::Hex),
			"base26" => BaseAlphabet::Base26,
			"base32" => BaseAlphabet::Base32,
			"base36" => BaseAlphabet::Base36,
			"base49" => BaseAlphabet::Base49,
			"base52" => BaseAlphabet::Base52,
			"base58" => BaseAlphabet::Base58,
			"base62" => BaseAlphabet::Base62,
			"base64" => BaseAlphabet::Base64,
			_ => {
				return Err(UnsupportedHash {
					token: name.to_owned(),
					message: "unknown digest encoding".into(),
				})
			},
		};
		Ok(Self::Base(alphabet))
	}
}

/// How to hash file contents for a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HashSpec {
	/// The hash algorithm.
	pub algorithm: HashAlgorithm,

	/// The encoding of the hash.
	pub encoding: DigestEncoding,

	/// Cut the encoded hash to this many characters.
	pub max_length: Option<usize>,
}

impl HashSpec {
	/// Hash and encode the content.
	pub fn digest(&self, content: &[u8]) -> String {
		let mut digest = self.encoding.encode(&self.algorithm.hash(content));
		if let Some(max_length) = self.max_length {
			// All encodings produce ASCII.
			digest.truncate(max_length);
		}
		digest
	}
}

/// Compute the MD5 hash of the content as lowercase hexadecimal.
pub fn content_hash(content: &[u8]) -> String {
	HashSpec::default().digest(content)
}

/// Find all hash tokens in a file name template.
pub(crate) fn find_hash_tokens(template: &str) -> Result<Vec<(Range<usize>, HashSpec)>, Error> {
	let regex = Regex::new(HASH_TOKEN).map_err(|e| InvalidPattern {
		pattern: HASH_TOKEN.into(),
		message: e.to_string(),
	})?;

	let mut tokens = Vec::new();
	for captures in regex.captures_iter(template) {
		let Some(whole) = captures.get(0) else {
			continue;
		};
		let in_token = |e: UnsupportedHash| UnsupportedHash {
			token: whole.as_str().to_owned(),
			message: format!("{} {:?}", e.message, e.token),
		};
		let mut spec = HashSpec::default();
		if let Some(algorithm) = captures.get(1) {
			spec.algorithm = algorithm.as_str().parse().map_err(in_token)?;
		}
		if let Some(encoding) = captures.get(2) {
			spec.encoding = encoding.as_str().parse().map_err(in_token)?;
		}
		if let Some(length) = captures.get(3) {
			let length = length.as_str().parse().map_err(|_| UnsupportedHash {
				token: whole.as_str().to_owned(),
				message: "the length is too large".into(),
			})?;
			spec.max_length = Some(length);
		}
		tracing::trace!(token = whole.as_str(), ?spec, "found hash token");
		tokens.push((whole.range(), spec));
	}
	Ok(tokens)
}

/// Write the number with little endian bytes `bytes` in the given digits, most significant digit first.
fn encode_base(bytes: &[u8], digits: &[u8]) -> String {
	let base = digits.len() as u32;
	let mut number: Vec<u8> = bytes.iter().rev().copied().skip_while(|&byte| byte == 0).collect();
	let mut output = Vec::new();
	while !number.is_empty() {
		let mut remainder = 0;
		let mut quotient = Vec::with_capacity(number.len());
		for &byte in &number {
			let accumulator = remainder * 256 + u32::from(byte);
			let digit = accumulator / base;
			remainder = accumulator % base;
			if !quotient.is_empty() || digit != 0 {
				quotient.push(digit as u8);
			}
		}
		output.push(digits[remainder as usize]);
		number = quotient;
	}
	output.iter().rev().map(|&digit| char::from(digit)).collect()
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use assert2::{assert, check, let_assert};

	const CONTENT: &[u8] = b"icon font";

	fn spec(algorithm: HashAlgorithm, encoding: DigestEncoding, max_length: Option<usize>) -> HashSpec {
		HashSpec { algorithm, encoding, max_length }
	}

	#[test]
	fn test_algorithms() {
		check!(content_hash(CONTENT) == "b349e24e569f516ce105fee205bbaaa4");
		check!(spec(HashAlgorithm::Sha1, DigestEncoding::Hex, None).digest(CONTENT) == "74be3a318863ac60e3e27abe4877f47e05a58c28");
		check!(spec(HashAlgorithm::Sha256, DigestEncoding::Hex, None).digest(CONTENT) == "0a2e15db40f025669c4f0f58a21c07594ce180ae57e73fb7fe5878978b21d057");
		check!(spec(HashAlgorithm::Sha512, DigestEncoding::Hex, Some(16)).digest(CONTENT) == "1ef7993b934d9711");
	}

	#[test]
	fn test_base_encodings() {
		let md5 = |alphabet| spec(HashAlgorithm::Md5, DigestEncoding::Base(alphabet), None).digest(CONTENT);
		check!(md5(BaseAlphabet::Base26) == "bjolbyrkclvnlvajpvisptnfhgzj");
		check!(md5(BaseAlphabet::Base36) == "9qyaeuzpccnvgwelpivfsszar");
		check!(md5(BaseAlphabet::Base58) == "mkmP5UkZx4BNgxv3NsUfGK");
		check!(md5(BaseAlphabet::Base62) == "50ILtnVKwbTFDyzrwGZw0X");
		check!(md5(BaseAlphabet::Base64) == "2AGHI5ULU5UmNhDRpeUACP");
		check!(spec(HashAlgorithm::Sha256, DigestEncoding::Base(BaseAlphabet::Base62), Some(10)).digest(CONTENT) == "kP2gokXfCE");
	}

	#[test]
	fn test_encode_base_small_numbers() {
		check!(encode_base(&[], b"0123456789") == "");
		check!(encode_base(&[0, 0], b"0123456789") == "");
		check!(encode_base(&[255], b"0123456789") == "255");
		check!(encode_base(&[0, 1], b"0123456789") == "256");
		check!(encode_base(&[1, 1, 0], b"0123456789") == "257");
	}

	#[test]
	fn test_find_hash_tokens() {
		let_assert!(Ok(tokens) = find_hash_tokens("[name].[ext]?[hash]"));
		assert!(tokens == [(13..19, HashSpec::default())]);

		let_assert!(Ok(tokens) = find_hash_tokens("[name]-[sha256:hash:base62:8]-[HASH:HEX]"));
		assert!(tokens == [
			(7..29, spec(HashAlgorithm::Sha256, DigestEncoding::Base(BaseAlphabet::Base62), Some(8))),
			(30..40, HashSpec::default()),
		]);

		let_assert!(Ok(tokens) = find_hash_tokens("[name].[ext]"));
		assert!(tokens.is_empty());
	}

	#[test]
	fn test_unsupported_hash_tokens() {
		let_assert!(Err(Error::UnsupportedHash(e)) = find_hash_tokens("[md4:hash]"));
		assert!(e.token == "[md4:hash]");
		assert!(e.message == "unknown hash algorithm \"md4\"");

		let_assert!(Err(Error::UnsupportedHash(e)) = find_hash_tokens("[hash:latin1:8]"));
		assert!(e.message == "unknown digest encoding \"latin1\"");

		let_assert!(Err(Error::UnsupportedHash(_)) = find_hash_tokens("[hash:hex:99999999999999999999999]"));
	}
}
