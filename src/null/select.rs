use serde_json::{Map, Value};

use crate::null::{Flag, FieldRef, NullableField, Record, Result};

/// Return whether a type name denotes a [`Nullable`](crate::null::Nullable) instantiation.
pub fn is_nullable_type_name(type_name: &str) -> bool {
	let Some((head, _)) = type_name.split_once('<') else {
		return false;
	};
	head.rsplit("::").next() == Some("Nullable")
}

fn flagged_names(record: &dyn Record, keep: impl Fn(&dyn NullableField) -> bool) -> Vec<&'static str> {
	record
		.fields()
		.into_iter()
		.filter_map(|field| match field.value {
			FieldRef::Nullable(value) if keep(value) => Some(field.desc.external_name()),
			_ => None,
		})
		.collect()
}

/// External names of selected nullable fields, in declaration order.
pub fn selected_field_names(record: &dyn Record) -> Vec<&'static str> {
	flagged_names(record, |value| value.flag(Flag::Selected))
}

/// External names of modified, writable nullable fields, in declaration order.
pub fn modified_field_names(record: &dyn Record) -> Vec<&'static str> {
	flagged_names(record, |value| value.flag(Flag::Modified) && !value.flag(Flag::ReadOnly))
}

/// Return whether any nullable field is modified.
pub fn any_modified(record: &dyn Record) -> bool {
	record
		.fields()
		.iter()
		.any(|field| matches!(field.value, FieldRef::Nullable(value) if value.flag(Flag::Modified)))
}

/// Sparse JSON projection of a record for partial updates.
///
/// Includes selected nullable fields, plus any field named (case-insensitively)
/// in `explicit`. Nested records are included when their own projection is
/// non-empty; record lists when they have elements.
pub fn selected_fields_as_map(record: &dyn Record, explicit: &[&str]) -> Result<Map<String, Value>> {
	let mut out = Map::new();
	for field in record.fields() {
		let name = field.desc.external_name();
		let named = explicit.iter().any(|item| field.desc.matches_ignore_case(item));

		match field.value {
			FieldRef::Nullable(value) => {
				if named || value.flag(Flag::Selected) {
					out.insert(name.to_owned(), value.to_json()?);
				}
			}
			FieldRef::Plain(value) => {
				if named {
					out.insert(name.to_owned(), value.to_json()?);
				}
			}
			FieldRef::Record(nested) => {
				let nested = selected_fields_as_map(nested, explicit)?;
				if !nested.is_empty() {
					out.insert(name.to_owned(), Value::Object(nested));
				}
			}
			FieldRef::Records(items) => {
				if items.is_empty() {
					continue;
				}
				let mut list = Vec::with_capacity(items.len());
				for item in items {
					list.push(Value::Object(selected_fields_as_map(item, explicit)?));
				}
				out.insert(name.to_owned(), Value::Array(list));
			}
		}
	}
	Ok(out)
}
