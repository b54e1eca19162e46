use std::any::{Any, type_name};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::null::{Flag, NullError, Nullable, Result, Scalar};

/// How a record field participates in introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// A [`Nullable`] container.
	Nullable,
	/// Any other cloneable, serializable value.
	Plain,
	/// A nested record.
	Record,
	/// A list of nested records.
	Records,
}

/// Static description of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDesc {
	/// Declared field name.
	pub name: &'static str,
	/// Serialization tag, e.g. `"addressLine2,omitempty"`.
	pub tag: Option<&'static str>,
	/// Field role.
	pub kind: FieldKind,
}

impl FieldDesc {
	/// External name: first comma-separated tag segment, else the declared name.
	pub fn external_name(&self) -> &'static str {
		match self.tag.and_then(|tag| tag.split(',').next()) {
			Some(name) if !name.is_empty() => name,
			_ => self.name,
		}
	}

	/// Return whether `name` addresses this field by external or declared name.
	pub fn matches(&self, name: &str) -> bool {
		name == self.external_name() || name == self.name
	}

	/// Case-insensitive [`FieldDesc::matches`].
	pub fn matches_ignore_case(&self, name: &str) -> bool {
		name.eq_ignore_ascii_case(self.external_name()) || name.eq_ignore_ascii_case(self.name)
	}
}

/// Borrowed view of one field's value.
pub enum FieldRef<'a> {
	/// Nullable container.
	Nullable(&'a dyn NullableField),
	/// Plain value.
	Plain(&'a dyn PlainField),
	/// Nested record.
	Record(&'a dyn Record),
	/// List of nested records.
	Records(Vec<&'a dyn Record>),
}

/// Mutable view of one field's value.
pub enum FieldRefMut<'a> {
	/// Nullable container.
	Nullable(&'a mut dyn NullableField),
	/// Plain value.
	Plain(&'a mut dyn PlainField),
	/// Nested record.
	Record(&'a mut dyn Record),
	/// List of nested records.
	Records(Vec<&'a mut dyn Record>),
}

/// Descriptor paired with a borrowed value.
pub struct Field<'a> {
	/// Static descriptor.
	pub desc: &'static FieldDesc,
	/// Borrowed value.
	pub value: FieldRef<'a>,
}

/// Descriptor paired with a mutable value.
pub struct FieldMut<'a> {
	/// Static descriptor.
	pub desc: &'static FieldDesc,
	/// Mutable value.
	pub value: FieldRefMut<'a>,
}

/// Struct whose fields are described by a static descriptor table.
///
/// Implement with [`impl_record!`](crate::impl_record).
pub trait Record {
	/// Name of the implementing type.
	fn record_name(&self) -> &'static str;
	/// Descriptor table in declaration order.
	fn descriptors(&self) -> &'static [FieldDesc];
	/// Borrow every field in declaration order.
	fn fields(&self) -> Vec<Field<'_>>;
	/// Mutably borrow every field in declaration order.
	fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;
}

/// Type-erased access to a [`Nullable`] container.
pub trait NullableField {
	/// Full type name of the container.
	fn type_name(&self) -> &'static str;
	/// Whether the payload is present.
	fn is_present(&self) -> bool;
	/// Read a bookkeeping flag.
	fn flag(&self, flag: Flag) -> bool;
	/// Write a bookkeeping flag.
	fn set_flag(&mut self, flag: Flag, value: bool);
	/// Encode the container as JSON.
	fn to_json(&self) -> Result<Value>;
	/// Guarded set from a JSON value: read-only check, decode, modification tracking.
	fn set_json(&mut self, value: &Value) -> Result<()>;
	/// Whether both payloads are structurally identical (presence ignored).
	fn data_identical(&self, other: &dyn NullableField) -> Result<bool>;
	/// Copy payload and presence from a container of the same type.
	fn copy_from(&mut self, other: &dyn NullableField) -> Result<()>;
	/// Upcast for downcasting.
	fn as_any(&self) -> &dyn Any;
}

fn downcast<'a, T: 'static>(expected: &'static str, other: &'a dyn NullableField) -> Result<&'a T> {
	other
		.as_any()
		.downcast_ref::<T>()
		.ok_or_else(|| NullError::mismatch(format!("{expected} vs {}", other.type_name())))
}

impl<T: Scalar + Serialize + DeserializeOwned> NullableField for Nullable<T> {
	fn type_name(&self) -> &'static str {
		type_name::<Self>()
	}

	fn is_present(&self) -> bool {
		self.present
	}

	fn flag(&self, flag: Flag) -> bool {
		match flag {
			Flag::Selected => self.selected,
			Flag::Modified => self.modified,
			Flag::ReadOnly => self.read_only,
		}
	}

	fn set_flag(&mut self, flag: Flag, value: bool) {
		match flag {
			Flag::Selected => self.selected = value,
			Flag::Modified => self.modified = value,
			Flag::ReadOnly => self.read_only = value,
		}
	}

	fn to_json(&self) -> Result<Value> {
		self.to_json_value()
	}

	fn set_json(&mut self, value: &Value) -> Result<()> {
		if self.read_only {
			return Err(NullError::ReadOnly { type_name: type_name::<T>() });
		}
		let mut next = Self::empty();
		next.decode_json_value(value)?;
		if next.present != self.present || (next.present && !next.data.identical(&self.data)) {
			self.modified = true;
		}
		self.data = next.data;
		self.present = next.present;
		self.selected = true;
		Ok(())
	}

	fn data_identical(&self, other: &dyn NullableField) -> Result<bool> {
		let other = downcast::<Self>(type_name::<Self>(), other)?;
		Ok(self.data.identical(&other.data))
	}

	fn copy_from(&mut self, other: &dyn NullableField) -> Result<()> {
		let other = downcast::<Self>(type_name::<Self>(), other)?;
		self.data = other.data.clone();
		self.present = other.present;
		Ok(())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Type-erased access to a non-nullable field.
pub trait PlainField {
	/// Encode the value as JSON.
	fn to_json(&self) -> Result<Value>;
	/// Assign from another plain field of the same type; false when not assignable.
	fn assign_from(&mut self, other: &dyn PlainField) -> bool;
	/// Upcast for downcasting.
	fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Clone + Serialize> PlainField for T {
	fn to_json(&self) -> Result<Value> {
		serde_json::to_value(self).map_err(|err| NullError::Encode { reason: err.to_string() })
	}

	fn assign_from(&mut self, other: &dyn PlainField) -> bool {
		match other.as_any().downcast_ref::<T>() {
			Some(value) => {
				*self = value.clone();
				true
			}
			None => false,
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Implement [`Record`](crate::null::Record) from a field list.
///
/// Each entry is `field: kind` with an optional `as "tag"`, where kind is one
/// of `nullable`, `plain`, `record`, or `records` (a `Vec` of records).
///
/// ```
/// use nullable::impl_record;
/// use nullable::null::Nullable;
///
/// #[derive(Default)]
/// struct Task {
/// 	task_id: i64,
/// 	project_id: Nullable<i64>,
/// }
///
/// impl_record!(Task {
/// 	task_id: plain as "task_id",
/// 	project_id: nullable as "project_id,omitempty",
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
	($ty:ty { $($field:ident : $kind:ident $(as $tag:literal)?),* $(,)? }) => {
		impl $crate::null::Record for $ty {
			fn record_name(&self) -> &'static str {
				::std::any::type_name::<$ty>()
			}

			fn descriptors(&self) -> &'static [$crate::null::FieldDesc] {
				const FIELDS: &[$crate::null::FieldDesc] = &[$(
					$crate::null::FieldDesc {
						name: stringify!($field),
						tag: $crate::__record_tag!($($tag)?),
						kind: $crate::__record_kind!($kind),
					},
				)*];
				FIELDS
			}

			fn fields(&self) -> ::std::vec::Vec<$crate::null::Field<'_>> {
				let values = ::std::vec![$($crate::__record_ref!($kind, self.$field)),*];
				$crate::null::Record::descriptors(self)
					.iter()
					.zip(values)
					.map(|(desc, value)| $crate::null::Field { desc, value })
					.collect()
			}

			fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::null::FieldMut<'_>> {
				let descriptors = $crate::null::Record::descriptors(self);
				let values = ::std::vec![$($crate::__record_mut!($kind, self.$field)),*];
				descriptors
					.iter()
					.zip(values)
					.map(|(desc, value)| $crate::null::FieldMut { desc, value })
					.collect()
			}
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
	() => {
		None
	};
	($tag:literal) => {
		Some($tag)
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_kind {
	(nullable) => {
		$crate::null::FieldKind::Nullable
	};
	(plain) => {
		$crate::null::FieldKind::Plain
	};
	(record) => {
		$crate::null::FieldKind::Record
	};
	(records) => {
		$crate::null::FieldKind::Records
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_ref {
	(nullable, $value:expr) => {
		$crate::null::FieldRef::Nullable(&$value)
	};
	(plain, $value:expr) => {
		$crate::null::FieldRef::Plain(&$value)
	};
	(record, $value:expr) => {
		$crate::null::FieldRef::Record(&$value)
	};
	(records, $value:expr) => {
		$crate::null::FieldRef::Records($value.iter().map(|item| item as &dyn $crate::null::Record).collect())
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_mut {
	(nullable, $value:expr) => {
		$crate::null::FieldRefMut::Nullable(&mut $value)
	};
	(plain, $value:expr) => {
		$crate::null::FieldRefMut::Plain(&mut $value)
	};
	(record, $value:expr) => {
		$crate::null::FieldRefMut::Record(&mut $value)
	};
	(records, $value:expr) => {
		$crate::null::FieldRefMut::Records($value.iter_mut().map(|item| item as &mut dyn $crate::null::Record).collect())
	};
}

#[cfg(test)]
mod tests;
