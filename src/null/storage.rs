use std::any::type_name;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::null::{NullError, Nullable, Result, Scalar};

/// Value exchanged with a relational driver, in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
	/// SQL `NULL`.
	Null,
	/// Boolean column value.
	Bool(bool),
	/// Integer column value (drivers widen every integer to 64 bits).
	Int(i64),
	/// Floating point column value.
	Float(f64),
	/// Text column value.
	Text(String),
	/// Raw bytes column value.
	Bytes(Vec<u8>),
	/// Timestamp column value.
	Timestamp(DateTime<FixedOffset>),
	/// Date column value.
	Date(NaiveDate),
}

impl StorageValue {
	/// Short description used in error messages.
	pub fn describe(&self) -> String {
		match self {
			Self::Null => "NULL".to_owned(),
			Self::Bool(value) => format!("bool {value}"),
			Self::Int(value) => format!("int {value}"),
			Self::Float(value) => format!("float {value}"),
			Self::Text(value) => format!("text {value:?}"),
			Self::Bytes(value) => format!("{} bytes", value.len()),
			Self::Timestamp(value) => format!("timestamp {}", value.to_rfc3339()),
			Self::Date(value) => format!("date {value}"),
		}
	}
}

/// Driver-side nullable scalar types a payload can be scanned through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
	/// Nullable string.
	String,
	/// Nullable bool.
	Bool,
	/// Nullable float, narrowed to 32 bits.
	Float32,
	/// Nullable float.
	Float64,
	/// Nullable 16-bit integer.
	Int16,
	/// Nullable 32-bit integer.
	Int32,
	/// Nullable 64-bit integer.
	Int64,
	/// Nullable timestamp.
	Timestamp,
	/// Nullable date.
	Date,
}

impl StorageKind {
	/// Coerce an incoming non-null driver value into this kind's canonical variant.
	///
	/// Mirrors the coercions a driver applies before assignment: numeric text
	/// parses into numbers, integers widen to floats, integral floats narrow to
	/// integers, and integers are range checked against the target width.
	pub fn convert(self, value: StorageValue) -> Result<StorageValue> {
		match self {
			Self::String => convert_text(value),
			Self::Bool => convert_bool(value),
			Self::Float32 | Self::Float64 => convert_float(value, self),
			Self::Int16 => convert_int(value, 16),
			Self::Int32 => convert_int(value, 32),
			Self::Int64 => convert_int(value, 64),
			Self::Timestamp => convert_timestamp(value),
			Self::Date => convert_date(value),
		}
	}

	fn label(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Bool => "bool",
			Self::Float32 => "float32",
			Self::Float64 => "float64",
			Self::Int16 => "int16",
			Self::Int32 => "int32",
			Self::Int64 => "int64",
			Self::Timestamp => "timestamp",
			Self::Date => "date",
		}
	}
}

fn text_of(value: StorageValue) -> std::result::Result<String, StorageValue> {
	match value {
		StorageValue::Text(text) => Ok(text),
		StorageValue::Bytes(bytes) => String::from_utf8(bytes).map_err(|err| StorageValue::Bytes(err.into_bytes())),
		other => Err(other),
	}
}

fn reject(kind: StorageKind, value: &StorageValue) -> NullError {
	NullError::shape(kind.label(), format!("storage {}", value.describe()))
}

fn convert_text(value: StorageValue) -> Result<StorageValue> {
	let text = match value {
		StorageValue::Text(text) => text,
		StorageValue::Bytes(bytes) => String::from_utf8(bytes).map_err(|err| NullError::shape("string", format!("non UTF-8 bytes ({err})")))?,
		StorageValue::Bool(value) => value.to_string(),
		StorageValue::Int(value) => value.to_string(),
		StorageValue::Float(value) => value.to_string(),
		StorageValue::Timestamp(value) => value.to_rfc3339(),
		StorageValue::Date(value) => value.to_string(),
		StorageValue::Null => return Err(reject(StorageKind::String, &StorageValue::Null)),
	};
	Ok(StorageValue::Text(text))
}

fn parse_bool(text: &str) -> Option<bool> {
	match text {
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
		_ => None,
	}
}

fn convert_bool(value: StorageValue) -> Result<StorageValue> {
	match value {
		StorageValue::Bool(value) => Ok(StorageValue::Bool(value)),
		StorageValue::Int(1) => Ok(StorageValue::Bool(true)),
		StorageValue::Int(0) => Ok(StorageValue::Bool(false)),
		other => {
			let text = text_of(other).map_err(|other| reject(StorageKind::Bool, &other))?;
			parse_bool(&text)
				.map(StorageValue::Bool)
				.ok_or_else(|| reject(StorageKind::Bool, &StorageValue::Text(text)))
		}
	}
}

fn convert_float(value: StorageValue, kind: StorageKind) -> Result<StorageValue> {
	let parsed = match value {
		StorageValue::Float(value) => value,
		StorageValue::Int(value) => value as f64,
		other => {
			let text = text_of(other).map_err(|other| reject(kind, &other))?;
			text.parse::<f64>().map_err(|_| reject(kind, &StorageValue::Text(text)))?
		}
	};
	if kind == StorageKind::Float32 && parsed.is_finite() && parsed.abs() > f64::from(f32::MAX) {
		return Err(reject(kind, &StorageValue::Float(parsed)));
	}
	Ok(StorageValue::Float(parsed))
}

fn fits(value: i64, bits: u32) -> bool {
	if bits >= 64 {
		return true;
	}
	let max = (1_i64 << (bits - 1)) - 1;
	let min = -(1_i64 << (bits - 1));
	(min..=max).contains(&value)
}

fn int_kind(bits: u32) -> StorageKind {
	match bits {
		16 => StorageKind::Int16,
		32 => StorageKind::Int32,
		_ => StorageKind::Int64,
	}
}

fn convert_int(value: StorageValue, bits: u32) -> Result<StorageValue> {
	let kind = int_kind(bits);
	let parsed = match value {
		StorageValue::Int(value) => value,
		StorageValue::Float(value) => {
			if value.fract() != 0.0 || !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
				return Err(reject(kind, &StorageValue::Float(value)));
			}
			value as i64
		}
		other => {
			let text = text_of(other).map_err(|other| reject(kind, &other))?;
			text.parse::<i64>().map_err(|_| reject(kind, &StorageValue::Text(text)))?
		}
	};
	if !fits(parsed, bits) {
		return Err(reject(kind, &StorageValue::Int(parsed)));
	}
	Ok(StorageValue::Int(parsed))
}

fn convert_timestamp(value: StorageValue) -> Result<StorageValue> {
	match value {
		StorageValue::Timestamp(value) => Ok(StorageValue::Timestamp(value)),
		other => {
			let text = text_of(other).map_err(|other| reject(StorageKind::Timestamp, &other))?;
			DateTime::parse_from_rfc3339(&text)
				.map(StorageValue::Timestamp)
				.map_err(|_| reject(StorageKind::Timestamp, &StorageValue::Text(text)))
		}
	}
}

fn convert_date(value: StorageValue) -> Result<StorageValue> {
	match value {
		StorageValue::Date(value) => Ok(StorageValue::Date(value)),
		StorageValue::Timestamp(value) => Ok(StorageValue::Date(value.date_naive())),
		other => {
			let text = text_of(other).map_err(|other| reject(StorageKind::Date, &other))?;
			if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
				return Ok(StorageValue::Date(date));
			}
			DateTime::parse_from_rfc3339(&text)
				.map(|value| StorageValue::Date(value.date_naive()))
				.map_err(|_| reject(StorageKind::Date, &StorageValue::Text(text)))
		}
	}
}

/// Inbound half of the driver convention: assign a column value.
pub trait Scanner {
	/// Assign `value`, treating [`StorageValue::Null`] as absence.
	fn scan(&mut self, value: StorageValue) -> Result<()>;
}

/// Outbound half of the driver convention: export a bind parameter.
pub trait Valuer {
	/// Return the value to bind, [`StorageValue::Null`] when absent.
	fn storage_value(&self) -> Result<StorageValue>;
}

impl<T: Scalar> Scanner for Nullable<T> {
	fn scan(&mut self, value: StorageValue) -> Result<()> {
		if value == StorageValue::Null {
			self.present = false;
			return Ok(());
		}

		let Some(kind) = T::STORAGE else {
			self.present = false;
			tracing::debug!(type_name = type_name::<T>(), "scan refused: no storage scalar type");
			return Err(NullError::UnsupportedType {
				type_name: type_name::<T>(),
				operation: "storage",
			});
		};

		match kind.convert(value).and_then(T::from_storage) {
			Ok(data) => {
				self.data = data;
				self.present = true;
				Ok(())
			}
			Err(err) => {
				self.present = false;
				Err(err)
			}
		}
	}
}

impl<T: Scalar> Valuer for Nullable<T> {
	fn storage_value(&self) -> Result<StorageValue> {
		if !self.present {
			return Ok(StorageValue::Null);
		}
		self.data.to_storage()
	}
}

#[cfg(test)]
mod tests {
	use super::{StorageKind, StorageValue, fits};

	#[test]
	fn int_width_bounds() {
		assert!(fits(i64::from(i16::MAX), 16));
		assert!(!fits(i64::from(i16::MAX) + 1, 16));
		assert!(fits(i64::from(i32::MIN), 32));
		assert!(!fits(i64::from(i32::MIN) - 1, 32));
		assert!(fits(i64::MIN, 64));
	}

	#[test]
	fn numeric_text_coerces_to_float() {
		let value = StorageKind::Float64.convert(StorageValue::Text("1.25".to_owned())).expect("numeric text");
		assert_eq!(value, StorageValue::Float(1.25));
	}

	#[test]
	fn float32_rejections_name_float32() {
		let err = StorageKind::Float32.convert(StorageValue::Text("abc".to_owned())).expect_err("not a number");
		assert!(err.to_string().contains("float32"), "{err}");
		let err = StorageKind::Float64.convert(StorageValue::Bool(true)).expect_err("not a number");
		assert!(err.to_string().contains("float64"), "{err}");
	}

	#[test]
	fn float32_range_is_checked() {
		assert!(StorageKind::Float32.convert(StorageValue::Float(1e39)).is_err());
		assert_eq!(StorageKind::Float64.convert(StorageValue::Float(1e39)).expect("fits"), StorageValue::Float(1e39));
	}

	#[test]
	fn integral_float_narrows_to_int() {
		assert_eq!(StorageKind::Int32.convert(StorageValue::Float(2.0)).expect("integral"), StorageValue::Int(2));
		assert!(StorageKind::Int32.convert(StorageValue::Float(2.5)).is_err());
	}

	#[test]
	fn driver_bool_literals() {
		assert_eq!(StorageKind::Bool.convert(StorageValue::Text("t".to_owned())).expect("t"), StorageValue::Bool(true));
		assert_eq!(StorageKind::Bool.convert(StorageValue::Int(0)).expect("0"), StorageValue::Bool(false));
		assert!(StorageKind::Bool.convert(StorageValue::Int(2)).is_err());
		assert!(StorageKind::Bool.convert(StorageValue::Float(1.0)).is_err());
	}

	#[test]
	fn bytes_are_text() {
		let value = StorageKind::String.convert(StorageValue::Bytes(b"abc".to_vec())).expect("utf-8");
		assert_eq!(value, StorageValue::Text("abc".to_owned()));
	}
}
