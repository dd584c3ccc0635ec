//! Common utilities for polytag integration tests.

use std::sync::LazyLock;

use polytag::{Mapper, typed_json};

use crate::model::animal::Animal;
use crate::model::person::Person;

/// Mapper binding `Person` and `Animal` to their own namespaces under `"type"`.
pub static ZOO: LazyLock<Mapper> = LazyLock::new(zoo_mapper);

/// Installs a log subscriber once per test binary.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Builds a fresh zoo mapper.
pub fn zoo_mapper() -> Mapper {
	init_tracing();
	typed_json("type")
		.to::<dyn Person>()
		.in_namespace("org::pkg::person")
		.to::<dyn Animal>()
		.in_namespace("org::pkg::animal")
		.mapper()
		.expect("zoo configuration is valid")
}
