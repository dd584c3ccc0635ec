//! Constructor selection on derived descriptors.

use std::sync::Arc;

use polytag::{
	CreatorDef, Described, Error, MapperSettings, NamesUnavailable, ParamDef, ParameterNameSource,
	Polymorphic, typed_json, untyped_json,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use crate::model::animal::{Animal, Cat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shipping {
	#[default]
	Standard,
	Express,
}

#[derive(Debug, PartialEq, Polymorphic)]
#[polytag(namespace = "shop", creator(Order::quick, item))]
pub struct Order {
	pub item: String,
	pub quantity: u32,
	#[polytag(default)]
	pub shipping: Shipping,
	pub coupon: Option<String>,
	#[polytag(skip)]
	pub cached_total: Option<u64>,
}

impl Order {
	fn quick(item: String) -> Self {
		Self {
			item,
			quantity: 1,
			shipping: Shipping::Express,
			coupon: None,
			cached_total: None,
		}
	}
}

#[derive(Debug, PartialEq, Polymorphic)]
#[polytag(namespace = "shop")]
pub struct Ping;

#[test]
fn canonical_creator_takes_every_field() {
	let mapper = untyped_json().mapper();
	let order: Order = mapper
		.read(r#"{"item":"tea","quantity":3,"shipping":"express","coupon":"TEA10"}"#)
		.unwrap();

	assert_eq!(
		order,
		Order {
			item: "tea".to_string(),
			quantity: 3,
			shipping: Shipping::Express,
			coupon: Some("TEA10".to_string()),
			cached_total: None,
		}
	);
}

#[test]
fn optional_fields_may_be_absent_or_null() {
	let mapper = untyped_json().mapper();
	let order: Order = mapper
		.read(r#"{"item":"tea","quantity":3,"shipping":null}"#)
		.unwrap();

	assert_eq!(order.shipping, Shipping::Standard);
	assert_eq!(order.coupon, None);
}

#[test]
fn narrower_creator_when_required_field_missing() {
	let mapper = untyped_json().mapper();
	let order: Order = mapper.read(r#"{"item":"tea","coupon":"X"}"#).unwrap();

	assert_eq!(order, Order::quick("tea".to_string()));
}

#[test]
fn no_creator_without_required_fields() {
	let err = untyped_json()
		.mapper()
		.read::<Order>(r#"{"quantity":3}"#)
		.unwrap_err();

	match err {
		Error::NoUsableConstructor { type_name, reason } => {
			assert_eq!(type_name, "shop::Order");
			assert!(reason.contains("item"), "{reason}");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn skipped_fields_are_not_written() {
	let order = Order {
		cached_total: Some(99),
		..Order::quick("tea".to_string())
	};

	assert_eq!(
		untyped_json().mapper().write(&order).unwrap(),
		r#"{"item":"tea","quantity":1,"shipping":"express","coupon":null}"#
	);
}

#[test]
fn derived_creators_follow_declaration_order() {
	let creators = Order::descriptor().creators;
	let names: Vec<Vec<&str>> = creators
		.iter()
		.map(|c| c.params.unwrap().iter().map(|p| p.name).collect())
		.collect();

	assert_eq!(
		names,
		vec![vec!["item", "quantity", "shipping", "coupon"], vec!["item"]]
	);
	assert_eq!(
		creators[0].params.unwrap().iter().map(|p| p.required).collect::<Vec<_>>(),
		vec![true, true, false, false]
	);
}

#[test]
fn strict_mode_rejects_only_unknown_properties() {
	let mut config = untyped_json().settings(MapperSettings::strict());
	let mapper = config.mapper();

	let err = mapper
		.read::<Order>(r#"{"item":"tea","quantity":3,"gift":true}"#)
		.unwrap_err();
	assert!(
		matches!(err, Error::UnknownProperty { type_name: "shop::Order", ref property } if property == "gift"),
		"{err}"
	);

	let order: Order = mapper.read(r#"{"item":"tea","coupon":"X"}"#).unwrap();
	assert_eq!(order.quantity, 1);
}

#[test]
fn unit_struct_reads_empty_object() {
	let mapper = untyped_json().mapper();
	let ping: Ping = mapper.read("{}").unwrap();

	assert_eq!(ping, Ping);
	assert_eq!(mapper.write(&Ping).unwrap(), "{}");
}

#[test]
fn wrong_property_type_names_property() {
	let err = untyped_json()
		.mapper()
		.read::<Order>(r#"{"item":"tea","quantity":"many"}"#)
		.unwrap_err();

	assert!(matches!(err, Error::Construct { type_name: "shop::Order", .. }), "{err}");
	assert!(err.to_string().contains("property `quantity`"), "{err}");
}

/// Reports every creator as compiled without parameter names.
struct NoNames;

impl ParameterNameSource for NoNames {
	fn parameter_names(
		&self,
		_creator: &'static CreatorDef,
	) -> Result<&'static [ParamDef], NamesUnavailable> {
		Err(NamesUnavailable)
	}
}

#[test]
fn missing_parameter_names_fail_closed() {
	let mapper = typed_json("type")
		.parameter_names(NoNames)
		.to::<dyn Animal>()
		.in_namespace("org::pkg::animal")
		.mapper()
		.unwrap();

	let err = mapper
		.read_base::<dyn Animal>(r#"{"type":"Cat","price":1,"name":"Bella"}"#)
		.err()
		.expect("error");
	assert!(
		matches!(err, Error::NoUsableConstructor { type_name: "org::pkg::animal::Cat", .. }),
		"{err}"
	);
}

#[test]
fn descriptor_cache_is_shared_by_clones() {
	let mapper = crate::common::zoo_mapper();
	let clone = mapper.clone();
	let _: Cat = clone.read(r#"{"price":1,"name":"Bella"}"#).unwrap();

	assert_eq!(mapper.creators().cached(), 1);
	assert!(Arc::ptr_eq(
		&mapper.creators().descriptor(Cat::descriptor()),
		&clone.creators().descriptor(Cat::descriptor()),
	));
	let cat = Cat::named("Tom".to_string());
	assert_eq!(cat.type_def().name, "Cat");
}
