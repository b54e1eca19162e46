use std::any::type_name;
use std::num::ParseFloatError;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

use crate::null::storage::{StorageKind, StorageValue};
use crate::null::{NullError, Result};

/// Closed set of payload kinds the codec layer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
	/// `bool`.
	Bool,
	/// Signed integer of the given bit width.
	Int {
		/// Width in bits (8, 16, 32 or 64).
		bits: u8,
	},
	/// Floating point number of the given bit width.
	Float {
		/// Width in bits (32 or 64).
		bits: u8,
	},
	/// UTF-8 string.
	String,
	/// Instant with an offset or zone.
	Timestamp,
	/// Calendar date without time.
	Date,
	/// Dynamically typed JSON value.
	Any,
	/// Struct-shaped payload; eligible for the omit-empty encode transform.
	Struct,
	/// Anything else; only the direct serde path is available.
	Other,
}

impl ScalarKind {
	/// Return whether JSON strings may be coerced into this kind.
	pub fn is_numeric(self) -> bool {
		matches!(self, Self::Int { .. } | Self::Float { .. })
	}
}

/// Per-kind codec capability resolved at compile time for a payload type.
///
/// Every method has a default, so struct-shaped payloads only need to pick a
/// [`ScalarKind`]:
///
/// ```
/// use nullable::null::{Scalar, ScalarKind};
///
/// #[derive(Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct Address {
/// 	line: String,
/// }
///
/// impl Scalar for Address {
/// 	const KIND: ScalarKind = ScalarKind::Struct;
/// }
/// ```
pub trait Scalar: Clone + Default + PartialEq + 'static {
	/// Kind used for codec dispatch.
	const KIND: ScalarKind = ScalarKind::Other;
	/// Storage scalar type used when scanning, if any.
	const STORAGE: Option<StorageKind> = None;

	/// Parse the content of a JSON string as a number of this type.
	fn from_numeric_str(text: &str) -> Result<Self> {
		Err(NullError::shape(type_name::<Self>(), format!("numeric string {text:?}")))
	}

	/// Parse a non-empty, non-`null` text form.
	fn parse_text(_text: &str) -> Result<Self> {
		Err(unsupported::<Self>("text"))
	}

	/// Render the text form of a present payload.
	fn format_text(&self) -> Result<String> {
		Err(unsupported::<Self>("text"))
	}

	/// Reject payloads that have no JSON representation.
	fn check_encodable(&self) -> Result<()> {
		Ok(())
	}

	/// Return whether a dynamically typed payload holds nothing.
	fn is_nil(&self) -> bool {
		false
	}

	/// Boolean coercion used by [`Nullable::as_truthy`](crate::null::Nullable::as_truthy).
	fn truthy(&self) -> bool {
		false
	}

	/// Semantic equality (same instant for timestamps).
	fn semantic_eq(&self, other: &Self) -> bool {
		self == other
	}

	/// Structural equality, including representation details such as offsets.
	fn identical(&self, other: &Self) -> bool {
		self == other
	}

	/// Build a payload from a value already converted to [`Self::STORAGE`].
	fn from_storage(_value: StorageValue) -> Result<Self> {
		Err(unsupported::<Self>("storage"))
	}

	/// Export a present payload for parameter binding.
	fn to_storage(&self) -> Result<StorageValue> {
		Err(unsupported::<Self>("storage"))
	}
}

fn unsupported<T>(operation: &'static str) -> NullError {
	NullError::UnsupportedType {
		type_name: type_name::<T>(),
		operation,
	}
}

fn unexpected_storage<T>(value: &StorageValue) -> NullError {
	NullError::shape(type_name::<T>(), format!("storage {}", value.describe()))
}

fn truthy_str(text: &str) -> bool {
	text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("y")
}

impl Scalar for bool {
	const KIND: ScalarKind = ScalarKind::Bool;
	const STORAGE: Option<StorageKind> = Some(StorageKind::Bool);

	fn parse_text(text: &str) -> Result<Self> {
		match text {
			"true" => Ok(true),
			"false" => Ok(false),
			_ => Err(NullError::shape("bool", format!("text {text:?}"))),
		}
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.to_string())
	}

	fn truthy(&self) -> bool {
		*self
	}

	fn from_storage(value: StorageValue) -> Result<Self> {
		match value {
			StorageValue::Bool(value) => Ok(value),
			other => Err(unexpected_storage::<Self>(&other)),
		}
	}

	fn to_storage(&self) -> Result<StorageValue> {
		Ok(StorageValue::Bool(*self))
	}
}

macro_rules! int_scalar {
	($($ty:ty => $bits:literal, $storage:expr;)*) => {$(
		impl Scalar for $ty {
			const KIND: ScalarKind = ScalarKind::Int { bits: $bits };
			const STORAGE: Option<StorageKind> = $storage;

			fn from_numeric_str(text: &str) -> Result<Self> {
				text.parse::<$ty>()
					.map_err(|err| NullError::shape(stringify!($ty), format!("numeric string {text:?} ({err})")))
			}

			fn parse_text(text: &str) -> Result<Self> {
				text.parse::<$ty>().map_err(|err| NullError::shape(stringify!($ty), format!("text {text:?} ({err})")))
			}

			fn format_text(&self) -> Result<String> {
				Ok(self.to_string())
			}

			fn truthy(&self) -> bool {
				*self == 1
			}

			fn from_storage(value: StorageValue) -> Result<Self> {
				match value {
					StorageValue::Int(value) => <$ty>::try_from(value)
						.map_err(|_| NullError::shape(stringify!($ty), format!("out of range integer {value}"))),
					other => Err(unexpected_storage::<Self>(&other)),
				}
			}

			fn to_storage(&self) -> Result<StorageValue> {
				Ok(StorageValue::Int(i64::from(*self)))
			}
		}
	)*};
}

int_scalar! {
	i8 => 8, None;
	i16 => 16, Some(StorageKind::Int16);
	i32 => 32, Some(StorageKind::Int32);
	i64 => 64, Some(StorageKind::Int64);
}

fn non_finite_literal(text: &str) -> bool {
	let body = text.strip_prefix(['+', '-']).unwrap_or(text);
	["nan", "inf", "infinity"].iter().any(|literal| body.eq_ignore_ascii_case(literal))
}

/// Parse a float of the target width; overflow to infinity is an error unless spelled out.
fn parse_float<F>(text: &str, form: &str) -> Result<F>
where
	F: FromStr<Err = ParseFloatError> + Into<f64> + Copy,
{
	let value = text
		.parse::<F>()
		.map_err(|err| NullError::shape(type_name::<F>(), format!("{form} {text:?} ({err})")))?;
	if !Into::<f64>::into(value).is_finite() && !non_finite_literal(text) {
		return Err(NullError::shape(type_name::<F>(), format!("{form} {text:?} (value out of range)")));
	}
	Ok(value)
}

macro_rules! float_scalar {
	($($ty:ident => $bits:literal, $storage:expr;)*) => {$(
		impl Scalar for $ty {
			const KIND: ScalarKind = ScalarKind::Float { bits: $bits };
			const STORAGE: Option<StorageKind> = Some($storage);

			fn from_numeric_str(text: &str) -> Result<Self> {
				parse_float(text, "numeric string")
			}

			fn parse_text(text: &str) -> Result<Self> {
				parse_float(text, "text")
			}

			fn format_text(&self) -> Result<String> {
				Ok(self.to_string())
			}

			fn check_encodable(&self) -> Result<()> {
				if self.is_finite() {
					return Ok(());
				}
				Err(NullError::Encode {
					reason: format!("unsupported value: {self}"),
				})
			}

			fn truthy(&self) -> bool {
				*self == 1.0
			}

			#[allow(clippy::unnecessary_cast)]
			fn from_storage(value: StorageValue) -> Result<Self> {
				match value {
					StorageValue::Float(value) => Ok(value as $ty),
					other => Err(unexpected_storage::<Self>(&other)),
				}
			}

			fn to_storage(&self) -> Result<StorageValue> {
				Ok(StorageValue::Float(f64::from(*self)))
			}
		}
	)*};
}

float_scalar! {
	f32 => 32, StorageKind::Float32;
	f64 => 64, StorageKind::Float64;
}

impl Scalar for String {
	const KIND: ScalarKind = ScalarKind::String;
	const STORAGE: Option<StorageKind> = Some(StorageKind::String);

	fn parse_text(text: &str) -> Result<Self> {
		Ok(text.to_owned())
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.clone())
	}

	fn truthy(&self) -> bool {
		truthy_str(self)
	}

	fn from_storage(value: StorageValue) -> Result<Self> {
		match value {
			StorageValue::Text(value) => Ok(value),
			other => Err(unexpected_storage::<Self>(&other)),
		}
	}

	fn to_storage(&self) -> Result<StorageValue> {
		Ok(StorageValue::Text(self.clone()))
	}
}

fn parse_rfc3339(text: &str) -> Result<DateTime<FixedOffset>> {
	DateTime::parse_from_rfc3339(text).map_err(|err| NullError::shape("RFC 3339 timestamp", format!("text {text:?} ({err})")))
}

impl Scalar for DateTime<Utc> {
	const KIND: ScalarKind = ScalarKind::Timestamp;
	const STORAGE: Option<StorageKind> = Some(StorageKind::Timestamp);

	fn parse_text(text: &str) -> Result<Self> {
		parse_rfc3339(text).map(|value| value.with_timezone(&Utc))
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
	}

	fn from_storage(value: StorageValue) -> Result<Self> {
		match value {
			StorageValue::Timestamp(value) => Ok(value.with_timezone(&Utc)),
			other => Err(unexpected_storage::<Self>(&other)),
		}
	}

	fn to_storage(&self) -> Result<StorageValue> {
		Ok(StorageValue::Timestamp(self.fixed_offset()))
	}
}

impl Scalar for DateTime<FixedOffset> {
	const KIND: ScalarKind = ScalarKind::Timestamp;
	const STORAGE: Option<StorageKind> = Some(StorageKind::Timestamp);

	fn parse_text(text: &str) -> Result<Self> {
		parse_rfc3339(text)
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
	}

	// `==` on chrono datetimes compares instants; the offset is representation.
	fn identical(&self, other: &Self) -> bool {
		self == other && self.offset() == other.offset()
	}

	fn from_storage(value: StorageValue) -> Result<Self> {
		match value {
			StorageValue::Timestamp(value) => Ok(value),
			other => Err(unexpected_storage::<Self>(&other)),
		}
	}

	fn to_storage(&self) -> Result<StorageValue> {
		Ok(StorageValue::Timestamp(*self))
	}
}

impl Scalar for NaiveDate {
	const KIND: ScalarKind = ScalarKind::Date;
	const STORAGE: Option<StorageKind> = Some(StorageKind::Date);

	fn parse_text(text: &str) -> Result<Self> {
		NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|err| NullError::shape("date", format!("text {text:?} ({err})")))
	}

	fn format_text(&self) -> Result<String> {
		Ok(self.format("%Y-%m-%d").to_string())
	}

	fn from_storage(value: StorageValue) -> Result<Self> {
		match value {
			StorageValue::Date(value) => Ok(value),
			other => Err(unexpected_storage::<Self>(&other)),
		}
	}

	fn to_storage(&self) -> Result<StorageValue> {
		Ok(StorageValue::Date(*self))
	}
}

impl Scalar for serde_json::Value {
	const KIND: ScalarKind = ScalarKind::Any;

	fn is_nil(&self) -> bool {
		self.is_null()
	}

	fn truthy(&self) -> bool {
		match self {
			serde_json::Value::Bool(value) => *value,
			serde_json::Value::String(value) => truthy_str(value),
			serde_json::Value::Number(value) => value.as_f64() == Some(1.0),
			_ => false,
		}
	}
}
