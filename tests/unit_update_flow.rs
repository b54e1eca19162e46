#![allow(missing_docs)]

use nullable::impl_record;
use nullable::null::{
	CopyOptions, Flag, Nullable, Scanner, StorageValue, any_modified, copy_left_to_right, mark_modified_if_differ, modified_field_names,
	selected_fields_as_map, set_flag_for_fields,
};
use nullable_testkit::parse_json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Account {
	#[serde(default)]
	id: Nullable<i64>,
	#[serde(default)]
	email: Nullable<String>,
	#[serde(default)]
	display_name: Nullable<String>,
	#[serde(default)]
	balance: Nullable<f64>,
}

impl_record!(Account {
	id: nullable as "id",
	email: nullable as "email",
	display_name: nullable as "displayName",
	balance: nullable as "balance",
});

fn stored() -> Account {
	let mut account = Account::default();
	account.id.scan(StorageValue::Int(15)).expect("id");
	account.email.scan(StorageValue::Text("a@x".to_owned())).expect("email");
	account.display_name.scan(StorageValue::Null).expect("name");
	account.balance.scan(StorageValue::Text("10.5".to_owned())).expect("balance");
	account
}

#[test]
fn patch_request_against_stored_row() {
	let mut base = stored();
	let mut patch: Account = serde_json::from_str(r#"{"email":"b@x","balance":"10.5"}"#).expect("decodes");
	set_flag_for_fields(&mut base, &["id"], Flag::ReadOnly, true, false);

	mark_modified_if_differ(&patch, &mut base).expect("same shape");
	assert!(any_modified(&base));
	assert_eq!(modified_field_names(&base), ["email"]);

	let opt = CopyOptions {
		restrict_to: Some(modified_field_names(&base).into_iter().map(str::to_owned).collect()),
		..CopyOptions::overwrite()
	};
	copy_left_to_right(&patch, &mut base, &opt).expect("same shape");
	assert_eq!(base.email.data, "b@x");
	assert_eq!(base.id.data, 15);

	patch.display_name.selected = true;
	let projection = selected_fields_as_map(&patch, &[]).expect("projects");
	assert_eq!(
		serde_json::Value::Object(projection),
		parse_json(r#"{"email":"b@x","displayName":null,"balance":10.5}"#)
	);
}

#[test]
fn read_only_fields_never_report_modified() {
	let mut base = stored();
	base.id.read_only = true;
	let patch: Account = serde_json::from_str(r#"{"id":99}"#).expect("decodes");

	mark_modified_if_differ(&patch, &mut base).expect("same shape");
	assert!(base.id.modified);
	assert!(modified_field_names(&base).is_empty());

	copy_left_to_right(&patch, &mut base, &CopyOptions::overwrite()).expect("same shape");
	assert_eq!(base.id.data, 15);
}
