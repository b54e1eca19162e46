use serde_json::Value;

use crate::null::{FieldDesc, FieldRef, FieldRefMut, NullError, Record, Result};

/// Bookkeeping flag addressed by the bulk helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
	/// Addressed by the last inbound operation.
	Selected,
	/// Differs from the last checkpoint.
	Modified,
	/// Rejects mutation through the setter.
	ReadOnly,
}

/// Behavior switches for [`copy_left_to_right`].
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
	/// Leave right-hand nullable fields that are selected untouched.
	pub keep_right: bool,
	/// Clear `selected` on right-hand fields kept by `keep_right`.
	pub clear_right_selected: bool,
	/// Copy only nullable fields (and nested records), never plain values.
	pub nullables_only: bool,
	/// Only copy top-level fields with these names (case-insensitive).
	pub restrict_to: Option<Vec<String>>,
}

impl CopyOptions {
	/// Copy everything from left over right.
	pub fn overwrite() -> Self {
		Self::default()
	}

	/// Fill right from left, keeping whatever right was explicitly given.
	pub fn patch() -> Self {
		Self {
			keep_right: true,
			..Self::default()
		}
	}
}

fn check_aligned(left: &dyn Record, right: &dyn Record) -> Result<()> {
	let (lhs, rhs) = (left.descriptors(), right.descriptors());
	if lhs.len() != rhs.len() {
		return Err(NullError::mismatch(format!(
			"{} has {} fields, {} has {}",
			left.record_name(),
			lhs.len(),
			right.record_name(),
			rhs.len()
		)));
	}
	for (idx, (a, b)) in lhs.iter().zip(rhs).enumerate() {
		if a != b {
			return Err(NullError::mismatch(format!("field {idx}: {} vs {}", describe(a), describe(b))));
		}
	}
	Ok(())
}

fn describe(desc: &FieldDesc) -> String {
	format!("{} ({:?}, tag {:?})", desc.name, desc.kind, desc.tag)
}

fn list_len_mismatch(desc: &FieldDesc, left: usize, right: usize) -> NullError {
	NullError::mismatch(format!("list {} has {left} items on the left, {right} on the right", desc.name))
}

/// Copy values from `left` onto the field-aligned `right`.
///
/// Read-only right-hand containers are never written. With `keep_right`, a
/// selected right-hand container is kept as is. Nested records recurse and
/// record lists must have equal lengths.
pub fn copy_left_to_right(left: &dyn Record, right: &mut dyn Record, opt: &CopyOptions) -> Result<()> {
	check_aligned(left, &*right)?;
	let nested = CopyOptions {
		restrict_to: None,
		..opt.clone()
	};

	for (src, dst) in left.fields().into_iter().zip(right.fields_mut()) {
		if let Some(names) = &opt.restrict_to
			&& !names.iter().any(|name| src.desc.matches_ignore_case(name))
		{
			continue;
		}

		match (src.value, dst.value) {
			(FieldRef::Nullable(from), FieldRefMut::Nullable(to)) => {
				if to.flag(Flag::ReadOnly) {
					tracing::debug!(field = src.desc.name, "copy skipped read-only field");
					continue;
				}
				if opt.keep_right && to.flag(Flag::Selected) {
					if opt.clear_right_selected {
						to.set_flag(Flag::Selected, false);
					}
					continue;
				}
				to.copy_from(from)?;
			}
			(FieldRef::Plain(from), FieldRefMut::Plain(to)) => {
				if !opt.nullables_only && !to.assign_from(from) {
					tracing::debug!(field = src.desc.name, "copy skipped unassignable field");
				}
			}
			(FieldRef::Record(from), FieldRefMut::Record(to)) => copy_left_to_right(from, to, &nested)?,
			(FieldRef::Records(from), FieldRefMut::Records(to)) => {
				if from.len() != to.len() {
					return Err(list_len_mismatch(src.desc, from.len(), to.len()));
				}
				for (from, to) in from.into_iter().zip(to) {
					copy_left_to_right(from, to, &nested)?;
				}
			}
			_ => return Err(NullError::mismatch(format!("field {} changed kind", src.desc.name))),
		}
	}
	Ok(())
}

/// Mark every selected nullable field modified, recursing into nested records.
///
/// Returns how many fields changed.
pub fn mark_modified_if_selected(record: &mut dyn Record) -> usize {
	let mut changed = 0;
	for field in record.fields_mut() {
		match field.value {
			FieldRefMut::Nullable(value) => {
				if value.flag(Flag::Selected) && !value.flag(Flag::Modified) {
					value.set_flag(Flag::Modified, true);
					changed += 1;
				}
			}
			FieldRefMut::Plain(_) => {}
			FieldRefMut::Record(nested) => changed += mark_modified_if_selected(nested),
			FieldRefMut::Records(items) => {
				for item in items {
					changed += mark_modified_if_selected(item);
				}
			}
		}
	}
	changed
}

/// Raise `modified` on `base` fields whose selected, writable `candidate` counterpart differs.
///
/// Presence counts: an explicit `null` against a present value differs, two
/// absent values never do.
pub fn mark_modified_if_differ(candidate: &dyn Record, base: &mut dyn Record) -> Result<()> {
	check_aligned(candidate, &*base)?;

	for (cand, field) in candidate.fields().into_iter().zip(base.fields_mut()) {
		match (cand.value, field.value) {
			(FieldRef::Nullable(cand_value), FieldRefMut::Nullable(base_value)) => {
				if cand_value.type_name() != base_value.type_name() {
					return Err(NullError::mismatch(format!(
						"field {}: {} vs {}",
						cand.desc.name,
						cand_value.type_name(),
						base_value.type_name()
					)));
				}
				if !cand_value.flag(Flag::Selected) || cand_value.flag(Flag::ReadOnly) {
					continue;
				}
				let same = cand_value.data_identical(&*base_value)?;
				let differs = match (cand_value.is_present(), base_value.is_present()) {
					(true, true) => !same,
					(false, false) => false,
					_ => true,
				};
				if differs {
					base_value.set_flag(Flag::Modified, true);
				}
			}
			(FieldRef::Plain(_), FieldRefMut::Plain(_)) => {}
			(FieldRef::Record(cand_value), FieldRefMut::Record(base_value)) => mark_modified_if_differ(cand_value, base_value)?,
			(FieldRef::Records(cand_items), FieldRefMut::Records(base_items)) => {
				if cand_items.len() != base_items.len() {
					return Err(list_len_mismatch(cand.desc, cand_items.len(), base_items.len()));
				}
				for (cand_item, base_item) in cand_items.into_iter().zip(base_items) {
					mark_modified_if_differ(cand_item, base_item)?;
				}
			}
			_ => return Err(NullError::mismatch(format!("field {} changed kind", cand.desc.name))),
		}
	}
	Ok(())
}

/// Set `flag` to `target` on the top-level nullable fields named in `names`.
///
/// With `invert_unlisted`, every other nullable field gets `!target`.
/// Returns how many flags actually changed.
pub fn set_flag_for_fields(record: &mut dyn Record, names: &[&str], flag: Flag, target: bool, invert_unlisted: bool) -> usize {
	let mut changed = 0;
	for field in record.fields_mut() {
		let FieldRefMut::Nullable(value) = field.value else {
			continue;
		};
		let listed = names.iter().any(|name| field.desc.matches(name));
		let want = if listed {
			target
		} else if invert_unlisted {
			!target
		} else {
			continue;
		};
		if value.flag(flag) != want {
			value.set_flag(flag, want);
			changed += 1;
		}
	}
	changed
}

/// Set the nullable field addressed by `name` from a JSON value, honoring read-only.
pub fn set_by_name(record: &mut dyn Record, name: &str, value: &Value) -> Result<()> {
	for field in record.fields_mut() {
		if let FieldRefMut::Nullable(target) = field.value
			&& field.desc.matches(name)
		{
			return target.set_json(value);
		}
	}
	Err(NullError::NilReceiver {
		operation: "set_by_name",
		attempted: format!("{name}={value}"),
	})
}
