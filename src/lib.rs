//! Nullable values with presence and selection tracking for partial updates.

/// Nullable container, codecs, storage bridge, and record introspection.
pub mod null;
