use std::any::type_name;

use serde::de::{self, DeserializeOwned};
use serde::ser::{self, Serialize, Serializer};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::null::{NullError, Nullable, Result, Scalar, ScalarKind};

/// Switches for JSON encoding of nullable values.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
	/// Prune empty keys at every nesting level of an unselected struct payload, not only the first.
	pub omit_empty_recursive: bool,
}

impl EncodeOptions {
	/// Preset that prunes empty keys at every depth.
	pub fn recursive() -> Self {
		Self { omit_empty_recursive: true }
	}
}

impl<T: Scalar + DeserializeOwned> Nullable<T> {
	/// Decode JSON bytes into a fresh container.
	pub fn from_json(input: &[u8]) -> Result<Self> {
		let mut out = Self::empty();
		out.decode_json(input)?;
		Ok(out)
	}

	/// Decode JSON bytes in place.
	///
	/// Always marks the value selected. On failure the value is left absent
	/// and malformed input is reported as [`NullError::DecodeSyntax`].
	pub fn decode_json(&mut self, input: &[u8]) -> Result<()> {
		self.selected = true;
		match serde_json::from_slice::<Value>(input) {
			Ok(value) => self.decode_json_value(&value),
			Err(err) => {
				self.present = false;
				Err(NullError::from_json(type_name::<T>(), err))
			}
		}
	}

	/// Decode an already parsed JSON value in place.
	///
	/// `null` makes the value absent. Anything else is decoded directly into
	/// `T`; numeric kinds additionally accept a JSON string holding a number of
	/// the matching bit width.
	pub fn decode_json_value(&mut self, value: &Value) -> Result<()> {
		self.selected = true;
		if value.is_null() {
			self.present = false;
			return Ok(());
		}

		match T::deserialize(value) {
			Ok(data) => {
				// JSON numbers are finite; infinity here means narrowing overflowed.
				if matches!(T::KIND, ScalarKind::Float { .. }) && data.check_encodable().is_err() {
					self.present = false;
					return Err(NullError::shape(type_name::<T>(), format!("number {value} (value out of range)")));
				}
				self.data = data;
				self.present = true;
				Ok(())
			}
			Err(err) => {
				self.present = false;
				let Value::String(text) = value else {
					return Err(NullError::from_json(type_name::<T>(), err));
				};
				if !T::KIND.is_numeric() {
					return Err(NullError::from_json(type_name::<T>(), err));
				}

				let data = T::from_numeric_str(text).inspect_err(|_| {
					tracing::debug!(type_name = type_name::<T>(), input = %text, "numeric string fallback rejected");
				})?;
				tracing::debug!(type_name = type_name::<T>(), "decoded number from JSON string");
				self.data = data;
				self.present = true;
				Ok(())
			}
		}
	}
}

impl<T: Scalar + Serialize> Nullable<T> {
	/// Encode to a JSON value with default [`EncodeOptions`].
	pub fn to_json_value(&self) -> Result<Value> {
		self.to_json_value_with(&EncodeOptions::default())
	}

	/// Encode to a JSON value.
	///
	/// Absent values become `null`. Non-finite floats are rejected. A present
	/// struct payload that was never selected has its empty keys pruned.
	pub fn to_json_value_with(&self, opt: &EncodeOptions) -> Result<Value> {
		if !self.present {
			return Ok(Value::Null);
		}
		self.data.check_encodable()?;

		let value = serde_json::to_value(&self.data).map_err(|err| NullError::Encode { reason: err.to_string() })?;
		if self.selected || T::KIND != ScalarKind::Struct {
			return Ok(value);
		}
		Ok(omit_empty(value, opt.omit_empty_recursive))
	}

	/// Encode to JSON bytes.
	pub fn encode_json(&self) -> Result<Vec<u8>> {
		let value = self.to_json_value()?;
		serde_json::to_vec(&value).map_err(|err| NullError::Encode { reason: err.to_string() })
	}
}

/// Drop object keys whose value is empty (`null`, `false`, `0`, `""`, `[]`; `{}` only when `recursive`).
pub fn omit_empty(value: Value, recursive: bool) -> Value {
	let Value::Object(map) = value else {
		return value;
	};

	let mut out = Map::with_capacity(map.len());
	for (key, item) in map {
		let item = if recursive { omit_empty(item, true) } else { item };
		if !is_empty_json(&item, recursive) {
			out.insert(key, item);
		}
	}
	Value::Object(out)
}

// Nested objects are struct values and stay, unless recursive pruning emptied them.
fn is_empty_json(value: &Value, recursive: bool) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(value) => !value,
		Value::Number(value) => value.as_f64() == Some(0.0),
		Value::String(value) => value.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => recursive && map.is_empty(),
	}
}

impl<T: Scalar + Serialize> Serialize for Nullable<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		if !self.present {
			return serializer.serialize_none();
		}
		self.data.check_encodable().map_err(ser::Error::custom)?;
		if self.selected || T::KIND != ScalarKind::Struct {
			return self.data.serialize(serializer);
		}
		self.to_json_value().map_err(ser::Error::custom)?.serialize(serializer)
	}
}

/// Decodes through [`Nullable::decode_json_value`]; the result is always selected.
///
/// Inside derived structs mark the field `#[serde(default)]` so an omitted key
/// leaves the value empty and unselected.
impl<'de, T: Scalar + DeserializeOwned> Deserialize<'de> for Nullable<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		let mut out = Self::empty();
		out.decode_json_value(&value).map_err(de::Error::custom)?;
		Ok(out)
	}
}
