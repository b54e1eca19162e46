use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, NullError>;

/// Errors produced while mutating, encoding, decoding, scanning, and diffing nullable values.
#[derive(Debug, Error)]
pub enum NullError {
	/// Mutation attempted through the setter on a read-only container.
	#[error("read-only value of type {type_name} cannot be set")]
	ReadOnly {
		/// Payload type of the rejected container.
		type_name: &'static str,
	},
	/// Operation needed a receiver that is absent.
	#[error("{operation}: no receiver (attempted {attempted})")]
	NilReceiver {
		/// Operation that was attempted.
		operation: &'static str,
		/// Rendering of the data the caller tried to apply.
		attempted: String,
	},
	/// Input is not well-formed JSON.
	#[error("null: could not unmarshal JSON: {0}")]
	DecodeSyntax(#[source] serde_json::Error),
	/// Well-formed input of the wrong kind, or a numeric coercion that does not fit.
	#[error("null: cannot decode {got} into {expected}")]
	DecodeShape {
		/// Expected payload type or literal form.
		expected: &'static str,
		/// Description of what was actually found.
		got: String,
	},
	/// Present payload has no valid encoding.
	#[error("null: could not marshal value: {reason}")]
	Encode {
		/// Why encoding was refused.
		reason: String,
	},
	/// Payload type has no codec or storage mapping for the operation.
	#[error("type {type_name} is not supported for {operation}")]
	UnsupportedType {
		/// Payload type name.
		type_name: &'static str,
		/// Boundary that lacks a mapping (`storage`, `text`, ...).
		operation: &'static str,
	},
	/// Two records passed to a diff/copy helper do not line up field by field.
	#[error("structural mismatch: {reason}")]
	StructuralMismatch {
		/// First difference found.
		reason: String,
	},
}

impl NullError {
	/// Return whether the error is a JSON syntax failure (as opposed to a shape failure).
	pub fn is_syntax(&self) -> bool {
		matches!(self, Self::DecodeSyntax(_))
	}

	/// Return whether the error is any kind of decode failure.
	pub fn is_decode(&self) -> bool {
		matches!(self, Self::DecodeSyntax(_) | Self::DecodeShape { .. })
	}

	/// Classify a `serde_json` parse error into syntax or shape.
	pub(crate) fn from_json(expected: &'static str, err: serde_json::Error) -> Self {
		if err.is_syntax() || err.is_eof() {
			Self::DecodeSyntax(err)
		} else {
			Self::DecodeShape {
				expected,
				got: err.to_string(),
			}
		}
	}

	pub(crate) fn shape(expected: &'static str, got: impl Into<String>) -> Self {
		Self::DecodeShape { expected, got: got.into() }
	}

	pub(crate) fn mismatch(reason: impl Into<String>) -> Self {
		Self::StructuralMismatch { reason: reason.into() }
	}
}
