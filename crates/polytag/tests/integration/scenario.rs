//! Reading and writing the zoo documents.

use polytag::{Described, Error, RegistryError, typed_json};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{self, ZOO};
use crate::model::animal::{Animal, Cat, Centaur, Dog};
use crate::model::birds::{Bird, Owl};
use crate::model::lost::LostEmployee;
use crate::model::person::{Employee, Person};

const BELLA: &str = r#"{"type":"Cat","price":1,"name":"Bella","nickname":"Bee"}"#;
const JOHN: &str =
	r#"{"type":"Employee","firstName":"John","lastName":"Public","employeeNumber":"EMP-0815"}"#;

#[test]
fn reads_and_writes_objects_in_named_namespaces() {
	let mapper = common::zoo_mapper();

	let animal = mapper.read_base::<dyn Animal>(BELLA).unwrap();
	let cat = animal.as_any().downcast_ref::<Cat>().expect("a Cat");
	assert_eq!(cat.name, "Bella");
	assert_eq!(cat.nickname.as_deref(), Some("Bee"));
	assert_eq!(mapper.write_base(&*animal).unwrap(), BELLA);
	assert_eq!(mapper.write(cat).unwrap(), BELLA);

	let person = mapper.read_base::<dyn Person>(JOHN).unwrap();
	let employee = person.as_any().downcast_ref::<Employee>().expect("an Employee");
	assert_eq!(employee.first_name, "John");
	assert_eq!(employee.last_name, "Public");
	assert_eq!(employee.employee_number, "EMP-0815");
	assert_eq!(mapper.write_base(&*person).unwrap(), JOHN);
}

#[test]
fn reads_objects_in_default_namespace() {
	common::init_tracing();
	let mapper = typed_json("type")
		.to::<dyn Person>()
		.in_namespace("")
		.mapper()
		.unwrap();

	let json = r#"{"type":"LostEmployee","firstName":"John","lastName":"Public","employeeNumber":"EMP-0815"}"#;
	let person = mapper.read_base::<dyn Person>(json).unwrap();
	assert_eq!(person.first_name(), "John");
	assert_eq!(
		person.as_any().downcast_ref::<LostEmployee>().map(|e| e.employee_number.as_str()),
		Some("EMP-0815")
	);
	assert_eq!(mapper.write_base(&*person).unwrap(), json);

	let person = mapper.read_base::<dyn Person>(JOHN).unwrap();
	assert_eq!(person.type_def().qualified, "org::pkg::person::Employee");
}

#[test]
fn default_namespace_type_is_invisible_to_named_binding() {
	let json = r#"{"type":"LostEmployee","firstName":"John","lastName":"Public","employeeNumber":"EMP-0815"}"#;
	let err = ZOO.read_base::<dyn Person>(json).err().expect("error");

	assert!(
		matches!(
			err,
			Error::Registry(RegistryError::UnknownTypeTag { base: "Person", ref tag }) if tag == "LostEmployee"
		),
		"{err}"
	);
}

#[test]
fn sibling_subtypes_round_trip() {
	let dog = Dog {
		name: "Rex".to_string(),
		tricks: vec!["sit".to_string(), "roll".to_string()],
	};
	let json = ZOO.write(&dog).unwrap();
	assert_eq!(json, r#"{"type":"Dog","name":"Rex","tricks":["sit","roll"]}"#);

	let animal = ZOO.read_base::<dyn Animal>(&json).unwrap();
	assert_eq!(animal.as_any().downcast_ref::<Dog>(), Some(&dog));
	assert_eq!(animal.name(), "Rex");
}

#[test]
fn type_with_two_bases_is_tagged_under_each() {
	common::init_tracing();
	let mapper = typed_json("type")
		.to_all(&[
			<dyn Person as polytag::BaseType>::base_def(),
			<dyn Animal as polytag::BaseType>::base_def(),
		])
		.in_namespace("org::pkg::animal")
		.mapper()
		.unwrap();

	let chiron = Centaur {
		name: "Chiron".to_string(),
	};
	let json = r#"{"type":"Centaur","name":"Chiron"}"#;
	assert_eq!(mapper.write_base::<dyn Person>(&chiron).unwrap(), json);
	assert_eq!(mapper.write_base::<dyn Animal>(&chiron).unwrap(), json);
	assert_eq!(mapper.read_base::<dyn Person>(json).unwrap().first_name(), "Chiron");
	assert_eq!(mapper.read_base::<dyn Animal>(json).unwrap().name(), "Chiron");
}

#[test]
fn unknown_tag_fails_without_partial_object() {
	let err = ZOO
		.read_base::<dyn Animal>(r#"{"type":"Griffin","name":"Gus"}"#)
		.err()
		.expect("error");

	assert_eq!(
		err.to_string(),
		r#"unknown type tag "Griffin" for base Animal"#
	);
}

#[test]
fn writing_unregistered_subtype_fails() {
	let chiron = Centaur {
		name: "Chiron".to_string(),
	};
	let err = ZOO.write_base::<dyn Person>(&chiron).unwrap_err();

	assert!(
		matches!(
			err,
			Error::Registry(RegistryError::UnregisteredSubtype {
				base: "Person",
				type_name: "org::pkg::animal::Centaur",
			})
		),
		"{err}"
	);
}

#[test]
fn concrete_read_checks_tag() {
	let cat: Cat = ZOO.read(BELLA).unwrap();
	assert_eq!(cat.price, 1);

	let err = ZOO.read::<Dog>(BELLA).unwrap_err();
	assert!(matches!(err, Error::TypeMismatch { .. }), "{err}");
}

#[test]
fn namespace_defaults_to_module_path() {
	common::init_tracing();
	let mapper = typed_json("kind").to::<dyn Bird>().mapper().unwrap();

	assert_eq!(Owl::descriptor().namespace, "integration::model::birds");
	assert_eq!(Owl::descriptor().qualified, "integration::model::birds::Owl");

	let json = r#"{"kind":"Owl","name":"Hedwig"}"#;
	let bird = mapper.read_base::<dyn Bird>(json).unwrap();
	assert_eq!(mapper.write_base(&*bird).unwrap(), json);
}

#[test]
fn descriptors_reach_the_inventory_pool() {
	let names: Vec<_> = polytag::inventory_types().map(|def| def.qualified).collect();
	for expected in [
		"org::pkg::animal::Cat",
		"org::pkg::animal::Dog",
		"org::pkg::person::Employee",
		"LostEmployee",
	] {
		assert!(names.contains(&expected), "{expected} missing from {names:?}");
	}
}

proptest! {
	/// Every cat survives a write/read cycle through its base type.
	#[test]
	fn cat_round_trips(
		price in any::<u32>(),
		name in "[A-Za-z ]{0,12}",
		nickname in proptest::option::of("[a-z]{1,8}"),
	) {
		let cat = Cat { price, name, nickname };
		let json = ZOO.write(&cat).unwrap();
		let animal = ZOO.read_base::<dyn Animal>(&json).unwrap();
		prop_assert_eq!(animal.as_any().downcast_ref::<Cat>(), Some(&cat));
		prop_assert_eq!(ZOO.write_base(&*animal).unwrap(), json);
	}
}
