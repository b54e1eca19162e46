//! Shared test helpers for workspace crates.

use serde_json::Value;

/// Parse JSON text, panicking with the offending input on failure.
pub fn parse_json(input: &str) -> Value {
	serde_json::from_str(input).unwrap_or_else(|err| panic!("invalid JSON fixture {input:?}: {err}"))
}

/// Return whether two JSON documents are semantically equal (key order ignored).
pub fn json_eq(actual: &str, expected: &str) -> bool {
	parse_json(actual) == parse_json(expected)
}

/// Assert that encoded bytes hold the same JSON document as `expected`.
#[track_caller]
pub fn assert_json_eq(actual: &[u8], expected: &str) {
	let actual = std::str::from_utf8(actual).unwrap_or_else(|err| panic!("encoded JSON is not UTF-8: {err}"));
	assert!(json_eq(actual, expected), "JSON mismatch:\n  actual:   {actual}\n  expected: {expected}");
}

/// Assert that encoded bytes are exactly `expected`, byte for byte.
#[track_caller]
pub fn assert_bytes_eq(actual: &[u8], expected: &str) {
	assert_eq!(String::from_utf8_lossy(actual), expected, "encoded bytes differ");
}
