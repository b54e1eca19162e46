use serde_json::json;

use crate::null::{Field, FieldKind, FieldRef, FieldRefMut, Flag, NullError, Nullable, NullableField, PlainField, Record};

#[derive(Default)]
struct Line {
	sku: String,
	qty: Nullable<i32>,
}

crate::impl_record!(Line {
	sku: plain,
	qty: nullable as "quantity,omitempty",
});

#[derive(Default)]
struct Order {
	id: i64,
	note: Nullable<String>,
	shipping: Line,
	lines: Vec<Line>,
}

crate::impl_record!(Order {
	id: plain as "id",
	note: nullable as ",omitempty",
	shipping: record,
	lines: records as "lines",
});

fn nullable_of<'a>(fields: &'a [Field<'a>], name: &str) -> &'a dyn NullableField {
	match fields.iter().find(|field| field.desc.name == name).map(|field| &field.value) {
		Some(FieldRef::Nullable(value)) => *value,
		_ => panic!("no nullable field {name}"),
	}
}

#[test]
fn descriptors_follow_declaration_order() {
	let order = Order::default();
	let kinds: Vec<_> = order.descriptors().iter().map(|desc| (desc.name, desc.kind)).collect();
	assert_eq!(
		kinds,
		[
			("id", FieldKind::Plain),
			("note", FieldKind::Nullable),
			("shipping", FieldKind::Record),
			("lines", FieldKind::Records),
		]
	);
	assert!(order.record_name().ends_with("Order"));
}

#[test]
fn external_name_uses_first_tag_segment() {
	let line = Line::default();
	let descs = line.descriptors();
	assert_eq!(descs[0].external_name(), "sku");
	assert_eq!(descs[1].external_name(), "quantity");
	assert!(descs[1].matches("qty"));
	assert!(descs[1].matches("quantity"));
	assert!(!descs[1].matches("Quantity"));
	assert!(descs[1].matches_ignore_case("Quantity"));

	// empty first segment keeps the declared name
	assert_eq!(Order::default().descriptors()[1].external_name(), "note");
}

#[test]
fn records_expose_every_element() {
	let mut order = Order {
		lines: vec![Line::default(), Line::default()],
		..Order::default()
	};
	let fields = order.fields();
	assert!(matches!(&fields[3].value, FieldRef::Records(items) if items.len() == 2));
	drop(fields);

	for field in order.fields_mut() {
		if let FieldRefMut::Records(items) = field.value {
			for item in items {
				for field in item.fields_mut() {
					if let FieldRefMut::Nullable(value) = field.value {
						value.set_flag(Flag::Selected, true);
					}
				}
			}
		}
	}
	assert!(order.lines.iter().all(|line| line.qty.selected));
}

#[test]
fn set_json_tracks_modification() {
	let mut qty = Nullable::from_value(3_i32);
	NullableField::set_json(&mut qty, &json!(3)).expect("same value");
	assert!(!qty.modified);
	assert!(qty.selected);

	NullableField::set_json(&mut qty, &json!("4")).expect("numeric string");
	assert_eq!(qty.data, 4);
	assert!(qty.modified);

	qty.modified = false;
	NullableField::set_json(&mut qty, &json!(null)).expect("null");
	assert!(!qty.present);
	assert!(qty.modified);
}

#[test]
fn set_json_rejects_read_only() {
	let mut note = Nullable::from_value("a".to_owned()).with_read_only(true);
	let err = NullableField::set_json(&mut note, &json!("b")).expect_err("read-only");
	assert!(matches!(err, NullError::ReadOnly { .. }));
	assert_eq!(note.data, "a");
	assert!(!note.modified);
}

#[test]
fn copy_from_requires_same_payload_type() {
	let line = Line {
		qty: Nullable::from_value(9),
		..Line::default()
	};
	let order = Order {
		note: Nullable::from_value("x".to_owned()),
		..Order::default()
	};
	let line_fields = line.fields();
	let order_fields = order.fields();

	let mut target = Nullable::<i32>::empty();
	NullableField::copy_from(&mut target, nullable_of(&line_fields, "qty")).expect("same type");
	assert!(target.present);
	assert_eq!(target.data, 9);
	assert!(!target.selected);

	let err = NullableField::copy_from(&mut target, nullable_of(&order_fields, "note")).expect_err("different type");
	assert!(matches!(err, NullError::StructuralMismatch { .. }));
}

#[test]
fn data_identical_ignores_presence() {
	let mut absent = Nullable::from_value(0_i32);
	absent.present = false;
	let zero = Nullable::from_value(0_i32);
	assert!(NullableField::data_identical(&absent, &zero).expect("same type"));
	assert!(!NullableField::data_identical(&Nullable::from_value(1_i32), &zero).expect("same type"));
}

#[test]
fn plain_fields_assign_only_same_type() {
	let mut sku = "a".to_owned();
	assert!(PlainField::assign_from(&mut sku, &"b".to_owned()));
	assert_eq!(sku, "b");
	assert!(!PlainField::assign_from(&mut sku, &7_i64));
	assert_eq!(PlainField::to_json(&sku).expect("encodes"), json!("b"));
}
