//! Placeholder replacement over all modules of a build pass.
//!
//! Replacement runs in three explicit stages for every module:
//!
//! 1. [`Replacer::collect()`] decides if a module takes part in replacement.
//! 2. [`Replacer::resolve()`] computes an [`Edit`] for the module without modifying it.
//! 3. [`Replacer::apply()`] writes the edit back into the module.
//!
//! Range edits on patchable modules are owned by the replacer,
//! so running it again with new data replaces its earlier edits.
//!
//! [`Replacer::run()`] executes all three stages for every module of a [`BuildPass`].
//!
//! # Example
//! ```
//! # fn main() -> Result<(), replace_holder::Error> {
//! use replace_holder::pipeline::{Replacer, ReplacerConfig, ReplacerOptions};
//! use replace_holder::source::{BuildPass, SourceRecord};
//!
//! let config = ReplacerConfig::new(ReplacerOptions {
//!     pattern: r"ICON_FONT\(([^)]*)\)".into(),
//!     ..Default::default()
//! })?;
//! let replacer = Replacer::new(config);
//!
//! let mut pass = BuildPass::new(vec![
//!     SourceRecord::plain("css ./icons.css", ".home::before { content: 'ICON_FONT(home)'; }"),
//! ]);
//! let summary = replacer.run(&mut pass, &[("home", "\\e001")])?;
//! assert_eq!(summary.rewritten, 1);
//! assert_eq!(pass.modules[0].payload.text(), ".home::before { content: '\\e001'; }");
//! # Ok(())
//! # }
//! ```

use std::ops::Range;

use regex::Regex;

use crate::error::{Error, InvalidPattern};
use crate::hash::HashSpec;
use crate::source::{BuildPass, SourcePayload, SourceRecord};
use crate::{DataMap, MatchRange, ReplacementValue, TokenPattern};

/// Options for placeholder replacement, before validation.
///
/// Use [`ReplacerConfig::new()`] to validate the options.
/// With the `serde` feature, the options can be deserialized using camel case keys
/// (`pattern`, `moduleMark`, `styleIdentifier`, `output`, `filename`, `publicPath`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default, deny_unknown_fields))]
pub struct ReplacerOptions {
	/// The regular expression for placeholder tokens.
	pub pattern: String,

	/// Only modules carrying this mark take part in replacement, apart from style modules.
	pub module_mark: Option<String>,

	/// Modules with an identifier matching this regular expression always take part in replacement.
	pub style_identifier: String,

	/// The output directory for emitted files, relative to the host's public path.
	pub output: String,

	/// The file name template for emitted files, with `[key]` placeholders.
	///
	/// Hash tokens like `[hash]` or `[sha256:hash:base62:8]` are filled in from the file content
	/// by [`ReplacerConfig::file_name_for_content()`].
	pub filename: String,

	/// A public path that replaces the host's public path and the output directory.
	pub public_path: Option<String>,
}

impl Default for ReplacerOptions {
	fn default() -> Self {
		Self {
			pattern: TokenPattern::DEFAULT.into(),
			module_mark: None,
			style_identifier: ReplacerConfig::DEFAULT_STYLE_IDENTIFIER.into(),
			output: "./".into(),
			filename: "[name].[ext]?[hash]".into(),
			public_path: None,
		}
	}
}

/// Validated, immutable configuration for placeholder replacement.
#[derive(Debug, Clone)]
pub struct ReplacerConfig {
	pattern: TokenPattern,
	module_mark: Option<String>,
	style_identifier: Regex,
	output: String,
	filename: String,
	filename_pattern: TokenPattern,
	hash_tokens: Vec<(Range<usize>, HashSpec)>,
	public_path: Option<String>,
}

impl ReplacerConfig {
	/// Identifiers of extracted style sheet modules start with `css` and whitespace.
	pub const DEFAULT_STYLE_IDENTIFIER: &'static str = r"^css\s+";

	/// Validate options.
	///
	/// Fails with [`Error::InvalidPattern`] if one of the regular expressions is invalid,
	/// or with [`Error::UnsupportedHash`] if the file name template asks for an unknown hash.
	pub fn new(options: ReplacerOptions) -> Result<Self, Error> {
		let pattern = TokenPattern::new(&options.pattern)?;
		let style_identifier = Regex::new(&options.style_identifier).map_err(|e| InvalidPattern {
			pattern: options.style_identifier.clone(),
			message: e.to_string(),
		})?;
		let filename_pattern = TokenPattern::delimited("[", "]")?;
		let hash_tokens = crate::hash::find_hash_tokens(&options.filename)?;
		Ok(Self {
			pattern,
			module_mark: options.module_mark,
			style_identifier,
			output: options.output,
			filename: options.filename,
			filename_pattern,
			hash_tokens,
			public_path: options.public_path,
		})
	}

	/// Get the token pattern.
	#[inline]
	pub fn pattern(&self) -> &TokenPattern {
		&self.pattern
	}

	/// Get the module mark, if configured.
	#[inline]
	pub fn module_mark(&self) -> Option<&str> {
		self.module_mark.as_deref()
	}

	/// Check if an identifier belongs to a style module.
	#[inline]
	pub fn is_style_identifier(&self, identifier: &str) -> bool {
		self.style_identifier.is_match(identifier)
	}

	/// Create the file name for an emitted file.
	///
	/// Every `[key]` in the file name template is replaced by the value for `key` in `data`.
	/// Unknown keys are kept as they are.
	pub fn file_name<'a, M>(&self, data: &'a M) -> String
	where
		M: DataMap<'a> + ?Sized,
		M::Value: ReplacementValue,
	{
		crate::resolve_to_string(&self.filename, &self.filename_pattern, data)
	}

	/// Create the file name for an emitted file from its content.
	///
	/// Every hash token in the file name template is replaced by the hash of `content`,
	/// then the remaining `[key]` placeholders are filled in from `data` like [`Self::file_name()`] does.
	pub fn file_name_for_content<'a, M>(&self, content: &[u8], data: &'a M) -> String
	where
		M: DataMap<'a> + ?Sized,
		M::Value: ReplacementValue,
	{
		let mut name = String::with_capacity(self.filename.len() + 32);
		let mut finger = 0;
		for (range, spec) in &self.hash_tokens {
			name.push_str(&self.filename[finger..range.start]);
			name.push_str(&spec.digest(content));
			finger = range.end;
		}
		name.push_str(&self.filename[finger..]);
		crate::resolve_to_string(&name, &self.filename_pattern, data)
	}

	/// Create the public URL of an emitted file.
	///
	/// If a public path is configured, the file name is resolved against it.
	/// Otherwise, the file name is placed in the output directory and resolved against `host_public_path`.
	pub fn file_url(&self, file_name: &str, host_public_path: &str) -> String {
		match &self.public_path {
			Some(public_path) => crate::output::public_url(public_path, file_name),
			None => crate::output::public_url(host_public_path, &crate::output::join_path(&self.output, file_name)),
		}
	}
}

impl TryFrom<ReplacerOptions> for ReplacerConfig {
	type Error = Error;

	#[inline]
	fn try_from(options: ReplacerOptions) -> Result<Self, Self::Error> {
		Self::new(options)
	}
}

/// Why a module takes part in replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
	/// The module identifier matches the style identifier pattern.
	Style,

	/// The module carries the configured mark, or no mark is configured.
	Module,
}

/// The edit computed for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
	/// Nothing to change.
	Unchanged,

	/// Replace the whole text.
	Replace(String),

	/// Apply range edits to the original text.
	Patch(Vec<MatchRange>),
}

/// Counters for one [`Replacer::run()`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
	/// The number of visited modules.
	pub visited: usize,

	/// The number of modules that took part in replacement.
	pub candidates: usize,

	/// The number of plain text modules that were rewritten.
	pub rewritten: usize,

	/// The number of patchable modules that received range edits.
	pub patched: usize,

	/// The total number of range edits.
	pub ranges: usize,
}

/// Runs placeholder replacement with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Replacer {
	config: ReplacerConfig,
	owner: String,
}

impl Replacer {
	/// The name under which a replacer records its edits on patchable text, unless set otherwise.
	pub const DEFAULT_OWNER: &'static str = "replace-holder";

	/// Create a replacer from a validated configuration.
	pub fn new(config: ReplacerConfig) -> Self {
		Self {
			config,
			owner: Self::DEFAULT_OWNER.into(),
		}
	}

	/// Set the name under which the replacer records its edits on patchable text.
	///
	/// Replacers with different owners keep separate edits on the same module.
	pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
		self.owner = owner.into();
		self
	}

	/// Get the configuration.
	#[inline]
	pub fn config(&self) -> &ReplacerConfig {
		&self.config
	}

	/// Get the name under which the replacer records its edits.
	#[inline]
	pub fn owner(&self) -> &str {
		&self.owner
	}

	/// Decide if a module takes part in replacement.
	pub fn collect(&self, record: &SourceRecord) -> Option<Candidate> {
		if self.config.is_style_identifier(&record.identifier) {
			return Some(Candidate::Style);
		}
		match self.config.module_mark() {
			Some(mark) if !record.has_mark(mark) => None,
			_ => Some(Candidate::Module),
		}
	}

	/// Compute the edit for a module.
	///
	/// Plain text is substituted outright.
	/// Patchable text is resolved to range edits on its original value.
	pub fn resolve<'a, M>(&self, record: &SourceRecord, data: &'a M) -> Edit
	where
		M: DataMap<'a> + ?Sized,
		M::Value: ReplacementValue,
	{
		match &record.payload {
			SourcePayload::PlainText(text) => {
				let resolved = crate::resolve_to_string(text, &self.config.pattern, data);
				if resolved == *text {
					Edit::Unchanged
				} else {
					Edit::Replace(resolved)
				}
			},
			SourcePayload::PatchableText(patchable) => {
				let ranges = crate::resolve_to_ranges(patchable.value(), &self.config.pattern, data);
				if ranges.is_empty() {
					Edit::Unchanged
				} else {
					Edit::Patch(ranges)
				}
			},
		}
	}

	/// Write an edit back into a module.
	///
	/// Range edits on plain text are applied directly.
	/// On patchable text, the edit replaces the edits this replacer made before:
	/// an unchanged result removes them,
	/// and a full replacement becomes one range edit over the whole value.
	/// Edits of other transforms are kept, and the call fails with [`Error::OverlappingRange`] if they conflict.
	pub fn apply(&self, record: &mut SourceRecord, edit: Edit) -> Result<(), Error> {
		match (&mut record.payload, edit) {
			(SourcePayload::PlainText(_), Edit::Unchanged) => Ok(()),
			(SourcePayload::PlainText(text), Edit::Replace(resolved)) => {
				*text = resolved;
				Ok(())
			},
			(SourcePayload::PlainText(text), Edit::Patch(ranges)) => {
				*text = crate::apply_ranges(text, &ranges)?;
				Ok(())
			},
			(SourcePayload::PatchableText(patchable), Edit::Unchanged) => {
				patchable.replace_ranges(&self.owner, std::iter::empty())
			},
			(SourcePayload::PatchableText(patchable), Edit::Patch(ranges)) => patchable.replace_ranges(&self.owner, ranges),
			(SourcePayload::PatchableText(patchable), Edit::Replace(resolved)) => {
				if patchable.value().is_empty() {
					*patchable = crate::source::PatchableText::new(resolved);
					return Ok(());
				}
				let whole = MatchRange::new(0, patchable.value().len() - 1, resolved);
				patchable.replace_ranges(&self.owner, [whole])
			},
		}
	}

	/// Run all stages for every module of a build pass.
	///
	/// Stops at the first module whose edit can not be applied.
	pub fn run<'a, M>(&self, pass: &mut BuildPass, data: &'a M) -> Result<RunSummary, Error>
	where
		M: DataMap<'a> + ?Sized,
		M::Value: ReplacementValue,
	{
		let mut summary = RunSummary::default();
		pass.try_for_each_module_mut(&mut |record| {
			summary.visited += 1;
			let Some(candidate) = self.collect(record) else {
				return Ok(());
			};
			summary.candidates += 1;

			let edit = self.resolve(record, data);
			match &edit {
				Edit::Unchanged => (),
				Edit::Replace(_) => summary.rewritten += 1,
				Edit::Patch(ranges) => {
					summary.patched += 1;
					summary.ranges += ranges.len();
				},
			}
			tracing::debug!(identifier = %record.identifier, ?candidate, edit = edit_kind(&edit), "resolved module");
			self.apply(record, edit)
		})?;
		tracing::debug!(
			visited = summary.visited,
			candidates = summary.candidates,
			rewritten = summary.rewritten,
			patched = summary.patched,
			ranges = summary.ranges,
			"placeholder replacement done",
		);
		Ok(summary)
	}
}

fn edit_kind(edit: &Edit) -> &'static str {
	match edit {
		Edit::Unchanged => "unchanged",
		Edit::Replace(_) => "replace",
		Edit::Patch(_) => "patch",
	}
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use crate::source::PatchableText;
	use crate::{DataMapping, NoData, Replacement};
	use assert2::{assert, check, let_assert};

	fn replacer(module_mark: Option<&str>) -> Replacer {
		let options = ReplacerOptions {
			pattern: r"BASE_PLUGIN\(([^)]*)\)".into(),
			module_mark: module_mark.map(String::from),
			..Default::default()
		};
		Replacer::new(ReplacerConfig::new(options).unwrap())
	}

	fn data() -> DataMapping {
		let mut data = DataMapping::new();
		data.insert("home".into(), Replacement::new("\u{e001}", "\\e001"));
		data.insert("search".into(), Replacement::new("\u{e002}", "\\e002"));
		data
	}

	#[test]
	fn test_invalid_config() {
		let_assert!(Err(Error::InvalidPattern(e)) = ReplacerConfig::new(ReplacerOptions {
			pattern: "BASE_PLUGIN(".into(),
			..Default::default()
		}));
		assert!(e.pattern == "BASE_PLUGIN(");

		let_assert!(Err(Error::InvalidPattern(e)) = ReplacerConfig::try_from(ReplacerOptions {
			style_identifier: "^css(".into(),
			..Default::default()
		}));
		assert!(e.pattern == "^css(");
	}

	#[test]
	fn test_collect() {
		let replacer = replacer(Some("iconFontModule"));
		check!(replacer.collect(&SourceRecord::plain("css ./a.css", "")) == Some(Candidate::Style));
		check!(replacer.collect(&SourceRecord::plain("./a.js", "").with_mark("iconFontModule")) == Some(Candidate::Module));
		check!(replacer.collect(&SourceRecord::plain("./a.js", "")) == None);
		check!(replacer.collect(&SourceRecord::plain("./css a.js", "")) == None);

		let replacer = self::replacer(None);
		check!(replacer.collect(&SourceRecord::plain("./a.js", "")) == Some(Candidate::Module));
	}

	#[test]
	fn test_resolve_dispatches_on_payload() {
		let replacer = replacer(None);
		let data = data();

		let plain = SourceRecord::plain("css ./a.css", "a::before { content: 'BASE_PLUGIN(home)'; }");
		check!(replacer.resolve(&plain, &data) == Edit::Replace("a::before { content: '\u{e001}'; }".into()));

		let patchable = SourceRecord::patchable("./a.js", "x = 'BASE_PLUGIN(home)'");
		check!(replacer.resolve(&patchable, &data) == Edit::Patch(vec![MatchRange::new(5, 21, "\\e001")]));

		let untouched = SourceRecord::patchable("./b.js", "x = 'BASE_PLUGIN(close)'");
		check!(replacer.resolve(&untouched, &data) == Edit::Unchanged);
	}

	#[test]
	fn test_run() {
		let replacer = replacer(Some("iconFontModule"));
		let mut pass = BuildPass::new(vec![
			SourceRecord::plain("css ./icons.css", ".a { content: 'BASE_PLUGIN(home)'; }"),
			SourceRecord::patchable("./icons.js", "[BASE_PLUGIN(home), BASE_PLUGIN(search), BASE_PLUGIN(home)]")
				.with_mark("iconFontModule"),
			SourceRecord::patchable("./other.js", "BASE_PLUGIN(home)"),
		])
		.with_child(BuildPass::new(vec![
			SourceRecord::plain("concatenated", "")
				.with_concatenated(SourceRecord::plain("css ./inner.css", "BASE_PLUGIN(search)")),
		]));

		let_assert!(Ok(summary) = replacer.run(&mut pass, &data()));
		assert!(summary == RunSummary {
			visited: 5,
			candidates: 3,
			rewritten: 2,
			patched: 1,
			ranges: 3,
		});

		assert!(pass.modules[0].payload.text() == ".a { content: '\u{e001}'; }");
		let_assert!(SourcePayload::PatchableText(icons) = &pass.modules[1].payload);
		assert!(icons.value() == "[BASE_PLUGIN(home), BASE_PLUGIN(search), BASE_PLUGIN(home)]");
		check!(let Ok("[\\e001, \\e002, \\e001]") = icons.render().as_deref());
		assert!(pass.modules[2].payload.text() == "BASE_PLUGIN(home)");
		assert!(pass.children[0].modules[0].concatenated[0].payload.text() == "\u{e002}");
	}

	#[test]
	fn test_run_twice_is_harmless() {
		let replacer = replacer(None);
		let mut pass = BuildPass::new(vec![SourceRecord::patchable("./a.js", "BASE_PLUGIN(home)")]);
		check!(let Ok(_) = replacer.run(&mut pass, &data()));
		check!(let Ok(_) = replacer.run(&mut pass, &data()));
		check!(let Ok("\\e001") = pass.modules[0].payload.render().as_deref());
	}

	#[test]
	fn test_run_again_with_new_data() {
		let replacer = replacer(None);
		let mut pass = BuildPass::new(vec![SourceRecord::patchable("./a.js", "x = 'BASE_PLUGIN(home)'")]);
		check!(let Ok(_) = replacer.run(&mut pass, &[("home", "\\e001")]));
		check!(let Ok("x = '\\e001'") = pass.modules[0].payload.render().as_deref());

		let_assert!(Ok(summary) = replacer.run(&mut pass, &[("home", "\\e002")]));
		assert!(summary.ranges == 1);
		check!(let Ok("x = '\\e002'") = pass.modules[0].payload.render().as_deref());

		// Without a value the earlier edit is withdrawn.
		check!(let Ok(_) = replacer.run(&mut pass, &NoData));
		check!(let Ok("x = 'BASE_PLUGIN(home)'") = pass.modules[0].payload.render().as_deref());
	}

	#[test]
	fn test_owners_keep_separate_edits() {
		let icons = replacer(None);
		let names = replacer(None).with_owner("names");
		assert!(icons.owner() == Replacer::DEFAULT_OWNER);

		let mut pass = BuildPass::new(vec![SourceRecord::patchable("./a.js", "BASE_PLUGIN(home) BASE_PLUGIN(title)")]);
		check!(let Ok(_) = icons.run(&mut pass, &data()));
		check!(let Ok(_) = names.run(&mut pass, &[("title", "Home")]));
		check!(let Ok("\\e001 Home") = pass.modules[0].payload.render().as_deref());

		// The second replacer resolving the same placeholder differently is a real conflict.
		let_assert!(Err(Error::OverlappingRange(_)) = names.run(&mut pass, &[("home", "H")]));
	}

	#[test]
	fn test_apply() {
		let replacer = replacer(None);
		let mut record = SourceRecord::plain("a", "A B");
		check!(let Ok(()) = replacer.apply(&mut record, Edit::Patch(vec![MatchRange::new(2, 2, "C")])));
		assert!(record.payload.text() == "A C");

		let mut record = SourceRecord::patchable("a", "A B");
		check!(let Ok(()) = replacer.apply(&mut record, Edit::Replace("D".into())));
		check!(let Ok("D") = record.payload.render().as_deref());
		check!(let Ok(()) = replacer.apply(&mut record, Edit::Replace("E".into())));
		check!(let Ok("E") = record.payload.render().as_deref());

		check!(let Ok(()) = replacer.apply(&mut record, Edit::Unchanged));
		check!(let Ok("A B") = record.payload.render().as_deref());

		let_assert!(SourcePayload::PatchableText(patchable) = &mut record.payload);
		check!(let Ok(()) = patchable.replace_ranges("other", [MatchRange::new(0, 0, "Z")]));
		check!(let Ok("Z B") = record.payload.render().as_deref());
		let_assert!(Err(Error::OverlappingRange(_)) = replacer.apply(&mut record, Edit::Replace("F".into())));

		let mut record = SourceRecord::new("a", SourcePayload::PatchableText(PatchableText::new("")));
		check!(let Ok(()) = replacer.apply(&mut record, Edit::Replace("F".into())));
		assert!(record.payload.text() == "F");
	}

	#[test]
	fn test_file_name_and_url() {
		let config = ReplacerConfig::new(ReplacerOptions {
			filename: "[fontName].[ext]?[hash]".into(),
			output: "fonts/".into(),
			..Default::default()
		}).unwrap();
		let name = config.file_name(&[("fontName", "icons"), ("ext", "woff2"), ("hash", "1a2b")]);
		assert!(name == "icons.woff2?1a2b");
		assert!(config.file_name(&[("fontName", "icons")]) == "icons.[ext]?[hash]");
		assert!(config.file_url(&name, "") == "fonts/icons.woff2?1a2b");
		assert!(config.file_url(&name, "https://cdn.example.com/assets") == "https://cdn.example.com/assets/fonts/icons.woff2?1a2b");

		let config = ReplacerConfig::new(ReplacerOptions {
			public_path: Some("/static".into()),
			..Default::default()
		}).unwrap();
		assert!(config.file_url("icons.woff2", "/ignored/") == "/static/icons.woff2");
	}

	#[test]
	fn test_file_name_for_content() {
		let data = [("name", "icons"), ("ext", "woff2"), ("hash", "ignored")];

		let config = ReplacerConfig::new(ReplacerOptions::default()).unwrap();
		assert!(config.file_name_for_content(b"icon font", &data) == "icons.woff2?b349e24e569f516ce105fee205bbaaa4");

		let config = ReplacerConfig::new(ReplacerOptions {
			filename: "[name].[md5:hash:hex:8].[ext]".into(),
			..Default::default()
		}).unwrap();
		assert!(config.file_name_for_content(b"icon font", &data) == "icons.b349e24e.woff2");

		let config = ReplacerConfig::new(ReplacerOptions {
			filename: "[name]-[sha256:hash:base62:10].[ext]".into(),
			..Default::default()
		}).unwrap();
		assert!(config.file_name_for_content(b"icon font", &data) == "icons-kP2gokXfCE.woff2");

		let config = ReplacerConfig::new(ReplacerOptions {
			filename: "[name].[ext]".into(),
			..Default::default()
		}).unwrap();
		assert!(config.file_name_for_content(b"icon font", &data) == "icons.woff2");
	}

	#[test]
	fn test_unsupported_hash_in_file_name() {
		let_assert!(Err(Error::UnsupportedHash(e)) = ReplacerConfig::new(ReplacerOptions {
			filename: "[name].[md4:hash].[ext]".into(),
			..Default::default()
		}));
		assert!(e.token == "[md4:hash]");
	}
}
