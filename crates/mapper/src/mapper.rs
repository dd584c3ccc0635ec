//! The configured JSON engine handle.

use std::any::Any;
use std::sync::Arc;

use polytag_registry::{
	AnyBox, BaseDef, BaseType, Described, Polymorphic, RegistryError, TypeDef, TypeRegistry,
};
use serde_json::{Map, Value};

use crate::creator::CreatorSelectionPolicy;
use crate::error::kind;
use crate::{Error, MapperSettings, Result, TypeResolver};

struct Inner {
	resolver: Option<TypeResolver>,
	creators: CreatorSelectionPolicy,
	settings: MapperSettings,
}

/// A configured, immutable JSON engine.
///
/// Cheap to clone; clones share the same registry and creator cache.
#[derive(Clone)]
pub struct Mapper {
	inner: Arc<Inner>,
}

impl Mapper {
	pub(crate) fn new(
		resolver: Option<TypeResolver>,
		creators: CreatorSelectionPolicy,
		settings: MapperSettings,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				resolver,
				creators,
				settings,
			}),
		}
	}

	/// Returns true if this mapper reads and writes type tags.
	pub fn is_typed(&self) -> bool {
		self.inner.resolver.is_some()
	}

	/// Returns the type resolver, `None` for an untyped mapper.
	pub fn resolver(&self) -> Option<&TypeResolver> {
		self.inner.resolver.as_ref()
	}

	/// Returns the type registry, `None` for an untyped mapper.
	pub fn registry(&self) -> Option<&TypeRegistry> {
		self.resolver().map(TypeResolver::registry)
	}

	pub fn creators(&self) -> &CreatorSelectionPolicy {
		&self.inner.creators
	}

	pub fn settings(&self) -> &MapperSettings {
		&self.inner.settings
	}

	/// Returns true if both handles refer to the same configured engine.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Reads a value declared as base type `B` from JSON text.
	///
	/// ```rust,ignore
	/// let animal: Box<dyn Animal> = mapper.read_base::<dyn Animal>(json)?;
	/// ```
	pub fn read_base<B: BaseType + ?Sized>(&self, json: &str) -> Result<Box<B>> {
		self.from_value_base(serde_json::from_str(json)?)
	}

	/// Reads a value declared as base type `B`, choosing the concrete type by tag.
	///
	/// # Errors
	///
	/// Fails without producing a partial value when the tag is missing or
	/// unknown, or the concrete type cannot be constructed.
	pub fn from_value_base<B: BaseType + ?Sized>(&self, value: Value) -> Result<Box<B>> {
		let base = B::base_def();
		let resolver = self.bound_resolver(base)?;
		let mut object = into_object(base.name, value)?;

		let def = resolver.take_tag(base, &mut object)?;
		let value = self.construct(def, object)?;
		upcast::<B>(base, def, value)
	}

	/// Reads a concrete `T` from JSON text.
	pub fn read<T: Described>(&self, json: &str) -> Result<T> {
		self.from_value(serde_json::from_str(json)?)
	}

	/// Reads a concrete `T`.
	///
	/// A typed mapper accepts the tag property when present; it must name `T`.
	pub fn from_value<T: Described>(&self, value: Value) -> Result<T> {
		let def = T::descriptor();
		let mut object = into_object(def.qualified, value)?;

		if let Some(resolver) = self.resolver() {
			if let Some(tag) = object.shift_remove(resolver.property()) {
				let found = match tag {
					Value::String(tag) => tag,
					other => other.to_string(),
				};
				if !resolver.is_tag_of(def, &found) {
					return Err(Error::TypeMismatch {
						expected: def.qualified,
						found,
					});
				}
			}
		}

		let value = self.construct(def, object)?;
		value
			.downcast::<T>()
			.map(|value| *value)
			.map_err(|_| Error::DescriptorMismatch {
				type_name: def.qualified,
				detail: "creator produced a value of another type",
			})
	}

	/// Writes `value` as JSON text, tagged under its first bound base type.
	pub fn write<T: Polymorphic + ?Sized>(&self, value: &T) -> Result<String> {
		Ok(serde_json::to_string(&self.to_value(value)?)?)
	}

	/// Writes `value`, tagged under the first bound base type its runtime type
	/// is registered under, untagged when there is none.
	pub fn to_value<T: Polymorphic + ?Sized>(&self, value: &T) -> Result<Value> {
		let def = value.type_def();
		let tag = self.resolver().and_then(|resolver| {
			let base = resolver.base_for(def)?;
			resolver.tag_for(base, value).ok()
		});
		self.encode(def, value.as_any(), tag)
	}

	/// Writes a value declared as base type `B` as JSON text.
	pub fn write_base<B: BaseType + Polymorphic + ?Sized>(&self, value: &B) -> Result<String> {
		Ok(serde_json::to_string(&self.to_value_base(value)?)?)
	}

	/// Writes a value declared as base type `B`, tagged under `B`.
	///
	/// # Errors
	///
	/// [`RegistryError::UnregisteredSubtype`] when the runtime type was never
	/// registered under `B`.
	pub fn to_value_base<B: BaseType + Polymorphic + ?Sized>(&self, value: &B) -> Result<Value> {
		let base = B::base_def();
		let resolver = self.bound_resolver(base)?;
		let tag = resolver.tag_for(base, value)?;
		self.encode(value.type_def(), value.as_any(), Some(tag))
	}

	fn bound_resolver(&self, base: &BaseDef) -> Result<&TypeResolver> {
		match self.resolver() {
			Some(resolver) if resolver.registry().is_bound(base) => Ok(resolver),
			Some(_) => Err(RegistryError::InvalidConfiguration(format!(
				"base type {} is not bound",
				base.name
			))
			.into()),
			None => Err(RegistryError::InvalidConfiguration(format!(
				"untyped mapper cannot handle base type {}",
				base.name
			))
			.into()),
		}
	}

	fn construct(&self, def: &'static TypeDef, object: Map<String, Value>) -> Result<AnyBox> {
		self.inner
			.creators
			.instantiate(def, object, &self.inner.settings)
	}

	/// Encodes the properties of `value`: tag first, then the widest creator's
	/// parameter order, then the remaining properties.
	fn encode(&self, def: &'static TypeDef, value: &dyn Any, tag: Option<&'static str>) -> Result<Value> {
		let mut properties = (def.properties)(value)
			.ok_or(Error::DescriptorMismatch {
				type_name: def.qualified,
				detail: "value is not of the descriptor's type",
			})?
			.map_err(|source| Error::Serialize {
				type_name: def.qualified,
				source,
			})?;

		let mut ordered = Map::with_capacity(properties.len());
		for param in self.inner.creators.property_order(def) {
			if let Some(value) = properties.shift_remove(param.name) {
				ordered.insert(param.name.to_string(), value);
			}
		}
		ordered.extend(properties);

		if !self.inner.settings.write_null_properties {
			ordered.retain(|_, value| !value.is_null());
		}

		let ordered = match (self.resolver(), tag) {
			(Some(resolver), Some(tag)) => resolver.tagged(tag, ordered),
			_ => ordered,
		};
		Ok(Value::Object(ordered))
	}
}

impl std::fmt::Debug for Mapper {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mapper")
			.field("resolver", &self.inner.resolver)
			.field("creators", &self.inner.creators)
			.field("settings", &self.inner.settings)
			.finish()
	}
}

fn into_object(type_name: &'static str, value: Value) -> Result<Map<String, Value>> {
	match value {
		Value::Object(object) => Ok(object),
		other => Err(Error::NotAnObject {
			type_name,
			found: kind(&other),
		}),
	}
}

fn upcast<B: BaseType + ?Sized>(base: &BaseDef, def: &'static TypeDef, value: AnyBox) -> Result<Box<B>> {
	let mismatch = |detail| Error::DescriptorMismatch {
		type_name: def.qualified,
		detail,
	};
	let supertype = def
		.supertype(base)
		.ok_or_else(|| mismatch("type does not extend the base type"))?;
	let erased = (supertype.upcast)(value)
		.map_err(|_| mismatch("creator produced a value of another type"))?;
	erased
		.downcast::<Box<B>>()
		.map(|boxed| *boxed)
		.map_err(|_| mismatch("upcast produced a value of another base type"))
}
