use std::str::FromStr;

use crate::null::{NullError, Nullable, Result, Scalar};

impl<T: Scalar> Nullable<T> {
	/// Decode a text form (form field, query parameter, ...) in place.
	///
	/// Empty input and the literal `null` make the value absent; anything else
	/// goes through [`Scalar::parse_text`]. Failure leaves the value absent.
	pub fn unmarshal_text(&mut self, text: &[u8]) -> Result<()> {
		self.selected = true;
		let text = match std::str::from_utf8(text) {
			Ok(text) => text,
			Err(err) => {
				self.present = false;
				return Err(NullError::shape("UTF-8 text", err.to_string()));
			}
		};

		if text.is_empty() || text == "null" {
			self.present = false;
			return Ok(());
		}

		match T::parse_text(text) {
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

	/// Encode the text form; absent values encode as empty bytes.
	pub fn marshal_text(&self) -> Result<Vec<u8>> {
		if !self.present {
			return Ok(Vec::new());
		}
		Ok(self.data.format_text()?.into_bytes())
	}
}

impl<T: Scalar> FromStr for Nullable<T> {
	type Err = NullError;

	fn from_str(text: &str) -> Result<Self> {
		let mut out = Self::empty();
		out.unmarshal_text(text.as_bytes())?;
		Ok(out)
	}
}
