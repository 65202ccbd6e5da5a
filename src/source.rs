//! Source records handed over by the host build.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;
use crate::{MatchRange, PatchSet};

/// The source payload of a module record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePayload {
	/// A plain string that can be replaced outright.
	PlainText(String),

	/// A structured source that only accepts range edits.
	PatchableText(PatchableText),
}

impl SourcePayload {
	/// Get the original text of the payload.
	///
	/// For a [`PatchableText`] this is the value without any pending edits applied.
	pub fn text(&self) -> &str {
		match self {
			Self::PlainText(text) => text,
			Self::PatchableText(patchable) => patchable.value(),
		}
	}

	/// Render the final text of the payload, with all pending edits applied.
	pub fn render(&self) -> Result<String, Error> {
		match self {
			Self::PlainText(text) => Ok(text.clone()),
			Self::PatchableText(patchable) => patchable.render(),
		}
	}
}

/// A source value with accumulated range edits.
///
/// The value itself is never modified,
/// so edits added by different transforms keep referring to the same offsets.
///
/// Edits are either anonymous, added with [`Self::add_ranges()`],
/// or owned by a named transform, set with [`Self::replace_ranges()`].
/// A transform can swap out its own edits when it runs again, without touching the edits of others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchableText {
	value: String,
	patches: PatchSet,
	owned: BTreeMap<String, PatchSet>,
}

impl PatchableText {
	/// Create a patchable text without any edits.
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			patches: PatchSet::new(),
			owned: BTreeMap::new(),
		}
	}

	/// Get the original value.
	#[inline]
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Get the anonymous pending edits.
	#[inline]
	pub fn patches(&self) -> &PatchSet {
		&self.patches
	}

	/// Get the pending edits owned by `owner`.
	#[inline]
	pub fn owned_patches(&self, owner: &str) -> Option<&PatchSet> {
		self.owned.get(owner)
	}

	/// Get all pending edits, anonymous and owned.
	pub fn all_patches(&self) -> Result<PatchSet, Error> {
		combine(std::iter::once(&self.patches).chain(self.owned.values()))
	}

	/// Add anonymous range edits computed against [`Self::value()`].
	///
	/// The ranges are checked against the value and all other edits before any of them is added,
	/// so a failed call leaves the pending edits untouched.
	pub fn add_ranges(&mut self, ranges: impl IntoIterator<Item = MatchRange>) -> Result<(), Error> {
		let mut patches = self.patches.clone();
		patches.extend(ranges)?;
		let mut all = combine(self.owned.values())?;
		all.extend(patches.iter().cloned())?;
		all.apply(&self.value)?;
		self.patches = patches;
		Ok(())
	}

	/// Replace the edits owned by `owner` with new range edits computed against [`Self::value()`].
	///
	/// The previous edits of `owner` are dropped, so they can not conflict with the new ones.
	/// Passing no ranges removes all edits of `owner`.
	/// A failed call leaves the pending edits untouched.
	pub fn replace_ranges(&mut self, owner: &str, ranges: impl IntoIterator<Item = MatchRange>) -> Result<(), Error> {
		let mut patches = PatchSet::new();
		patches.extend(ranges)?;
		let others = self.owned.iter().filter(|(name, _)| *name != owner).map(|(_, set)| set);
		let mut all = combine(std::iter::once(&self.patches).chain(others))?;
		all.extend(patches.iter().cloned())?;
		all.apply(&self.value)?;
		if patches.is_empty() {
			self.owned.remove(owner);
		} else {
			self.owned.insert(owner.to_owned(), patches);
		}
		Ok(())
	}

	/// Render the value with all pending edits applied.
	pub fn render(&self) -> Result<String, Error> {
		self.all_patches()?.apply(&self.value)
	}
}

/// Merge several patch sets into one.
fn combine<'a>(sets: impl IntoIterator<Item = &'a PatchSet>) -> Result<PatchSet, Error> {
	let mut all = PatchSet::new();
	for set in sets {
		all.extend(set.iter().cloned())?;
	}
	Ok(all)
}

/// A module record from the host build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
	/// The identifier the host uses for the module.
	pub identifier: String,

	/// Marks set on the module by the host, used to decide if the module takes part in replacement.
	pub marks: BTreeSet<String>,

	/// The source of the module.
	pub payload: SourcePayload,

	/// Modules that were concatenated into this one.
	///
	/// They are visited after the module itself.
	pub concatenated: Vec<SourceRecord>,
}

impl SourceRecord {
	/// Create a record with a plain text source.
	pub fn plain(identifier: impl Into<String>, text: impl Into<String>) -> Self {
		Self::new(identifier, SourcePayload::PlainText(text.into()))
	}

	/// Create a record with a patchable source.
	pub fn patchable(identifier: impl Into<String>, text: impl Into<String>) -> Self {
		Self::new(identifier, SourcePayload::PatchableText(PatchableText::new(text)))
	}

	/// Create a record from an identifier and a payload.
	pub fn new(identifier: impl Into<String>, payload: SourcePayload) -> Self {
		Self {
			identifier: identifier.into(),
			marks: BTreeSet::new(),
			payload,
			concatenated: Vec::new(),
		}
	}

	/// Add a mark to the record.
	pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
		self.marks.insert(mark.into());
		self
	}

	/// Add a module that was concatenated into this record.
	pub fn with_concatenated(mut self, record: SourceRecord) -> Self {
		self.concatenated.push(record);
		self
	}

	/// Check if the record carries a mark.
	#[inline]
	pub fn has_mark(&self, mark: &str) -> bool {
		self.marks.contains(mark)
	}
}

/// The modules of one build pass and of its child passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPass {
	/// The modules of this pass.
	pub modules: Vec<SourceRecord>,

	/// Child passes, for example for separately compiled workers.
	pub children: Vec<BuildPass>,
}

impl BuildPass {
	/// Create a pass from a list of modules.
	pub fn new(modules: Vec<SourceRecord>) -> Self {
		Self {
			modules,
			children: Vec::new(),
		}
	}

	/// Add a child pass.
	pub fn with_child(mut self, child: BuildPass) -> Self {
		self.children.push(child);
		self
	}

	/// Count all modules, including concatenated modules and the modules of child passes.
	pub fn module_count(&self) -> usize {
		let mut count = 0;
		self.for_each_module(&mut |_| count += 1);
		count
	}

	/// Visit all modules.
	///
	/// Each module is visited before the modules concatenated into it.
	/// The modules of child passes are visited after the modules of this pass.
	pub fn for_each_module<F>(&self, fun: &mut F)
	where
		F: FnMut(&SourceRecord),
	{
		fn visit<F: FnMut(&SourceRecord)>(record: &SourceRecord, fun: &mut F) {
			fun(record);
			for inner in &record.concatenated {
				visit(inner, fun);
			}
		}

		for record in &self.modules {
			visit(record, fun);
		}
		for child in &self.children {
			child.for_each_module(fun);
		}
	}

	/// Visit all modules mutably, in the same order as [`Self::for_each_module()`].
	///
	/// Stops at the first error returned by `fun`.
	pub fn try_for_each_module_mut<F, E>(&mut self, fun: &mut F) -> Result<(), E>
	where
		F: FnMut(&mut SourceRecord) -> Result<(), E>,
	{
		fn visit<F, E>(record: &mut SourceRecord, fun: &mut F) -> Result<(), E>
		where
			F: FnMut(&mut SourceRecord) -> Result<(), E>,
		{
			fun(record)?;
			for inner in &mut record.concatenated {
				visit(inner, fun)?;
			}
			Ok(())
		}

		for record in &mut self.modules {
			visit(record, fun)?;
		}
		for child in &mut self.children {
			child.try_for_each_module_mut(fun)?;
		}
		Ok(())
	}
}
