mod diff;
mod error;
mod json;
mod record;
mod scalar;
mod select;
mod storage;
mod text;
mod value;

/// Bulk flag updates, record copies, and change detection.
pub use diff::{CopyOptions, Flag, copy_left_to_right, mark_modified_if_differ, mark_modified_if_selected, set_by_name, set_flag_for_fields};
/// Error and result aliases.
pub use error::{NullError, Result};
/// JSON encoding options and the empty-key pruning transform.
pub use json::{EncodeOptions, omit_empty};
/// Record introspection types.
pub use record::{Field, FieldDesc, FieldKind, FieldMut, FieldRef, FieldRefMut, NullableField, PlainField, Record};
/// Per-payload codec capability.
pub use scalar::{Scalar, ScalarKind};
/// Selection projections over records.
pub use select::{any_modified, is_nullable_type_name, modified_field_names, selected_field_names, selected_fields_as_map};
/// Storage driver bridge.
pub use storage::{Scanner, StorageKind, StorageValue, Valuer};
/// The nullable container and its optional-reference truthiness helper.
pub use value::{Nullable, as_truthy};
