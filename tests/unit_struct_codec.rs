#![allow(missing_docs)]

use nullable::impl_record;
use nullable::null::{EncodeOptions, Nullable, Scalar, ScalarKind, modified_field_names, selected_field_names, selected_fields_as_map};
use nullable_testkit::{assert_bytes_eq, assert_json_eq, parse_json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Task {
	task_id: i64,
	#[serde(default)]
	project_id: Nullable<i64>,
	#[serde(default)]
	subject: Nullable<String>,
	#[serde(default)]
	category_id: Nullable<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoteUpdate {
	#[serde(default)]
	id: Nullable<i64>,
	#[serde(default)]
	title: Nullable<String>,
	#[serde(default)]
	notes: Nullable<String>,
}

impl_record!(NoteUpdate {
	id: nullable as "id",
	title: nullable as "title",
	notes: nullable as "notes",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Geo {
	lat: f64,
	lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Address {
	address_line1: String,
	address_line2: String,
	zip: i32,
	geo: Geo,
}

impl Scalar for Address {
	const KIND: ScalarKind = ScalarKind::Struct;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Person {
	#[serde(default)]
	name: Nullable<String>,
	#[serde(default)]
	address: Nullable<Address>,
}

fn address() -> Address {
	Address {
		address_line1: "1 Main St".to_owned(),
		..Address::default()
	}
}

#[test]
fn struct_with_absent_field_encodes_null() {
	let task = Task {
		task_id: 1,
		project_id: Nullable::from_value(5),
		subject: Nullable::from_value("kjell".to_owned()),
		category_id: Nullable::empty(),
	};
	let encoded = serde_json::to_vec(&task).expect("encodes");
	assert_bytes_eq(&encoded, r#"{"task_id":1,"project_id":5,"subject":"kjell","category_id":null}"#);
}

#[test]
fn partial_update_separates_null_from_missing() {
	let update: NoteUpdate = serde_json::from_str(r#"{"id":15,"notes":null}"#).expect("decodes");
	assert!(update.id.present && update.id.selected);
	assert_eq!(update.id.data, 15);
	assert!(!update.notes.present);
	assert!(update.notes.selected);
	assert!(!update.title.present);
	assert!(!update.title.selected);

	assert_eq!(selected_field_names(&update), ["id", "notes"]);
	let projection = selected_fields_as_map(&update, &[]).expect("projects");
	assert_eq!(serde_json::Value::Object(projection), parse_json(r#"{"id":15,"notes":null}"#));
}

#[test]
fn explicit_names_join_the_projection() {
	let update: NoteUpdate = serde_json::from_str(r#"{"id":15}"#).expect("decodes");
	let projection = selected_fields_as_map(&update, &["TITLE"]).expect("projects");
	assert_eq!(serde_json::Value::Object(projection), parse_json(r#"{"id":15,"title":null}"#));
}

#[test]
fn modified_names_skip_read_only_fields() {
	let mut update = NoteUpdate::default();
	update.id.set(3).expect("writable");
	update.title.set("t".to_owned()).expect("writable");
	update.title.read_only = true;
	assert_eq!(modified_field_names(&update), ["id"]);
}

#[test]
fn numeric_strings_decode_inside_structs() {
	let task: Task = serde_json::from_str(r#"{"task_id":1,"project_id":"5"}"#).expect("decodes");
	assert_eq!(task.project_id.data, 5);
	assert!(!task.category_id.selected);

	let err = serde_json::from_str::<Task>(r#"{"task_id":1,"project_id":"five"}"#).expect_err("not a number");
	assert!(err.is_data());
}

#[test]
fn unselected_struct_payload_omits_empty_keys() {
	let mut person = Person {
		name: Nullable::from_value("Kjell".to_owned()),
		address: Nullable::from_value(address()),
	};
	assert_json_eq(
		&serde_json::to_vec(&person).expect("encodes"),
		r#"{"name":"Kjell","address":{"addressLine1":"1 Main St","addressLine2":"","zip":0,"geo":{"lat":0.0,"lng":0.0}}}"#,
	);

	person.address.selected = false;
	assert_json_eq(
		&serde_json::to_vec(&person).expect("encodes"),
		r#"{"name":"Kjell","address":{"addressLine1":"1 Main St","geo":{"lat":0.0,"lng":0.0}}}"#,
	);

	let deep = person.address.to_json_value_with(&EncodeOptions::recursive()).expect("encodes");
	assert_eq!(deep, parse_json(r#"{"addressLine1":"1 Main St"}"#));
}

#[test]
fn chained_struct_round_trips() {
	let input = r#"{"name":"Kjell","address":{"addressLine1":"1 Main St","zip":1234,"geo":{"lat":1.5,"lng":2.5}}}"#;
	let person: Person = serde_json::from_str(input).expect("decodes");
	assert!(person.address.selected);
	assert_eq!(person.address.data.zip, 1234);
	assert_eq!(person.address.data.geo.lng, 2.5);

	let absent: Person = serde_json::from_str(r#"{"name":null,"address":null}"#).expect("decodes");
	assert!(!absent.address.present);
	assert_bytes_eq(&serde_json::to_vec(&absent).expect("encodes"), r#"{"name":null,"address":null}"#);
}

#[test]
fn missing_struct_keys_fall_back_to_default() {
	let person: Person = serde_json::from_str(r#"{"name":"Kjell"}"#).expect("decodes");
	assert!(!person.address.selected);
	assert!(person.address.is_omittable());
}
