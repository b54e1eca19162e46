use std::any::type_name;
use std::fmt;

use crate::null::{NullError, Result, Scalar};

/// Presence-tracking wrapper around a payload of type `T`.
///
/// `present` maps to JSON/SQL non-null. `selected` records that the last
/// inbound operation addressed this value (so "sent as null" differs from
/// "never sent"). `modified` is only ever set by explicit comparisons, and
/// `read_only` makes [`Nullable::set`] fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Nullable<T> {
	/// Payload; meaningless while `present` is false and not scrubbed when it becomes false.
	pub data: T,
	/// Whether `data` is meaningful.
	pub present: bool,
	/// Whether the last inbound operation addressed this value.
	pub selected: bool,
	/// Whether `data` differs from a prior checkpoint.
	pub modified: bool,
	/// Whether the setter must reject mutation.
	pub read_only: bool,
}

impl<T: Default> Default for Nullable<T> {
	fn default() -> Self {
		Self {
			data: T::default(),
			present: false,
			selected: false,
			modified: false,
			read_only: false,
		}
	}
}

impl<T: Scalar> Nullable<T> {
	/// Absent value with every flag cleared.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Present, selected value. A nil dynamic payload constructs absent.
	pub fn from_value(value: T) -> Self {
		if value.is_nil() {
			return Self::empty();
		}
		Self {
			data: value,
			present: true,
			selected: true,
			..Self::default()
		}
	}

	/// Absent for `None`, otherwise [`Nullable::from_value`] of a clone.
	pub fn from_ref(value: Option<&T>) -> Self {
		value.map_or_else(Self::empty, |value| Self::from_value(value.clone()))
	}

	/// Absent for `None`, otherwise [`Nullable::from_value`].
	pub fn from_option(value: Option<T>) -> Self {
		value.map_or_else(Self::empty, Self::from_value)
	}

	/// Return the same value with the read-only flag set to `read_only`.
	pub fn with_read_only(mut self, read_only: bool) -> Self {
		self.read_only = read_only;
		self
	}

	/// Assign a present value through the guarded setter.
	///
	/// Fails with [`NullError::ReadOnly`] without touching any state when the
	/// container is read-only. `modified` is raised when the container was
	/// absent or the new payload differs structurally from the previous one.
	pub fn set(&mut self, value: T) -> Result<()> {
		if self.read_only {
			return Err(NullError::ReadOnly { type_name: type_name::<T>() });
		}
		if !self.present || !self.data.identical(&value) {
			self.modified = true;
		}
		self.data = value;
		self.present = true;
		self.selected = true;
		Ok(())
	}

	/// Return the payload, failing when there is none.
	pub fn get(&self) -> Result<&T> {
		if self.present {
			return Ok(&self.data);
		}
		Err(NullError::NilReceiver {
			operation: "get",
			attempted: type_name::<T>().to_owned(),
		})
	}

	/// Borrow the payload when present.
	pub fn as_option(&self) -> Option<&T> {
		self.present.then_some(&self.data)
	}

	/// Convert into an `Option`, dropping flags.
	pub fn into_option(self) -> Option<T> {
		self.present.then_some(self.data)
	}

	/// Return `data` when present, else the zero value of `T`.
	pub fn value_or_default(&self) -> T {
		if self.present { self.data.clone() } else { T::default() }
	}

	/// Return whether absent, or present holding the zero value of `T`.
	pub fn is_zero(&self) -> bool {
		!self.present || self.data == T::default()
	}

	/// Return whether the value was never addressed and holds nothing.
	///
	/// Suitable for `#[serde(skip_serializing_if = "Nullable::is_omittable")]`.
	pub fn is_omittable(&self) -> bool {
		!self.selected && !self.present
	}

	/// Semantic equality: timestamps compare as instants, everything else structurally.
	pub fn equal(&self, other: &Self) -> bool {
		match (self.present, other.present) {
			(true, true) => self.data.semantic_eq(&other.data),
			(false, false) => true,
			_ => false,
		}
	}

	/// Exact equality: presence must match and present payloads must be identical.
	pub fn exact_equal(&self, other: &Self) -> bool {
		match (self.present, other.present) {
			(true, true) => self.data.identical(&other.data),
			(false, false) => true,
			_ => false,
		}
	}

	/// Coerce the payload to a boolean using the [`Scalar::truthy`] rule table.
	pub fn as_truthy(&self) -> bool {
		self.data.truthy()
	}
}

/// Truthiness of an optional container; `None` is false.
pub fn as_truthy<T: Scalar>(value: Option<&Nullable<T>>) -> bool {
	value.is_some_and(Nullable::as_truthy)
}

impl<T: Scalar> From<Option<T>> for Nullable<T> {
	fn from(value: Option<T>) -> Self {
		Self::from_option(value)
	}
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.present { self.data.fmt(f) } else { Ok(()) }
	}
}
