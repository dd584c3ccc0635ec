//! Tag emission and resolution on top of a [`TypeRegistry`].

use polytag_registry::{BaseDef, Polymorphic, RegistryError, TypeDef, TypeRegistry};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Maps instances to tags and tags to types under one tag property.
#[derive(Debug)]
pub struct TypeResolver {
	registry: TypeRegistry,
	property: String,
}

impl TypeResolver {
	pub fn new(registry: TypeRegistry, property: impl Into<String>) -> Self {
		Self {
			registry,
			property: property.into(),
		}
	}

	/// Returns the name of the tag property.
	pub fn property(&self) -> &str {
		&self.property
	}

	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	/// Returns the tag of the runtime type of `value` under `base`.
	pub fn tag_for(
		&self,
		base: &BaseDef,
		value: &(impl Polymorphic + ?Sized),
	) -> Result<&'static str, RegistryError> {
		self.registry.tag_of(base, value.type_def())
	}

	/// Returns the concrete type named by `tag` under `base`.
	pub fn type_for(&self, base: &BaseDef, tag: &str) -> Result<&'static TypeDef, RegistryError> {
		self.registry.resolve(base, tag)
	}

	/// Returns the first bound base type `def` is registered under.
	pub fn base_for(&self, def: &TypeDef) -> Option<&'static BaseDef> {
		self.registry
			.bases()
			.find(|base| self.registry.tag_of(base, def).is_ok())
	}

	/// Returns true if `tag` names `def`, either as its simple name or as its
	/// tag under some bound base.
	pub fn is_tag_of(&self, def: &TypeDef, tag: &str) -> bool {
		def.name == tag
			|| self
				.registry
				.bases()
				.any(|base| self.registry.tag_of(base, def) == Ok(tag))
	}

	/// Removes the tag property from `object` and resolves it under `base`.
	///
	/// # Errors
	///
	/// - [`Error::MissingTypeTag`] when the property is absent or not a string.
	/// - [`RegistryError::UnknownTypeTag`] when no subtype carries the tag.
	pub fn take_tag(&self, base: &BaseDef, object: &mut Map<String, Value>) -> Result<&'static TypeDef> {
		let Some(Value::String(tag)) = object.shift_remove(&self.property) else {
			return Err(Error::MissingTypeTag {
				base: base.name,
				property: self.property.clone(),
			});
		};
		Ok(self.type_for(base, &tag)?)
	}

	/// Prepends the tag property to `properties`. A property of the same name
	/// is replaced by the tag; finalizing a configuration rejects subtypes
	/// whose creators name it.
	pub fn tagged(&self, tag: &'static str, properties: Map<String, Value>) -> Map<String, Value> {
		let mut out = Map::with_capacity(properties.len() + 1);
		out.insert(self.property.clone(), Value::from(tag));
		for (key, value) in properties {
			if key != self.property {
				out.insert(key, value);
			}
		}
		out
	}
}
