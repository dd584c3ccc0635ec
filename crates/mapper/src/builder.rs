//! Configuration assembler.
//!
//! Bindings of base types to namespace prefixes accumulate in a chain of
//! builders and are finalized into a [`Mapper`]:
//!
//! ```rust,ignore
//! let mapper = typed_json("type")
//!     .to::<dyn Person>()
//!     .in_namespace("org::pkg::person")
//!     .to::<dyn Animal>()
//!     .in_namespace("org::pkg::animal")
//!     .mapper()?;
//!
//! let plain = untyped_json().mapper();
//! ```
//!
//! Finalizing again without new bindings returns the same handle. Adding
//! bindings and finalizing again yields a new handle; earlier handles keep
//! their configuration.
//!
//! Configuration errors made mid-chain are reported by `mapper()`; the
//! bindings collected so far stay with the builder.

use std::sync::Arc;

use polytag_registry::{
	BaseDef, BaseType, RegistryError, TypeDef, TypeRegistry, TypeRegistryBuilder,
};

use crate::creator::CreatorSelectionPolicy;
use crate::creator::names::{DescriptorNames, ParameterNameResolver, ParameterNameSource};
use crate::{Mapper, MapperSettings, Result, TypeResolver};

/// Starts a typed configuration whose documents carry the tag in `property`.
pub fn typed_json(property: impl Into<String>) -> TypedJson {
	TypedJson {
		assembly: Assembly::new(property.into()),
	}
}

/// Starts an untyped configuration: no tag property, no polymorphism.
pub fn untyped_json() -> UntypedJson {
	UntypedJson {
		names: Arc::new(DescriptorNames),
		settings: MapperSettings::default(),
		built: None,
	}
}

/// State shared by every stage of the typed chain.
struct Assembly {
	property: String,
	bindings: Vec<(&'static BaseDef, String)>,
	pool: Option<Vec<&'static TypeDef>>,
	names: Arc<dyn ParameterNameSource>,
	settings: MapperSettings,
	invalid: Option<String>,
	built: Option<(usize, Mapper)>,
}

impl Assembly {
	fn new(property: String) -> Self {
		Self {
			property,
			bindings: Vec::new(),
			pool: None,
			names: Arc::new(DescriptorNames),
			settings: MapperSettings::default(),
			invalid: None,
			built: None,
		}
	}

	fn reject(&mut self, reason: &str) {
		self.invalid.get_or_insert_with(|| reason.to_string());
		self.invalidate();
	}

	fn bind(&mut self, base: &'static BaseDef, namespace: &str) {
		self.bindings.push((base, namespace.to_string()));
	}

	fn finalize(&mut self) -> Result<Mapper> {
		if let Some(reason) = &self.invalid {
			return Err(RegistryError::InvalidConfiguration(reason.clone()).into());
		}
		if let Some((count, mapper)) = &self.built {
			if *count == self.bindings.len() {
				return Ok(mapper.clone());
			}
		}

		if self.property.is_empty() {
			return Err(RegistryError::InvalidConfiguration(
				"type tag property name is empty".to_string(),
			)
			.into());
		}

		let builder = TypeRegistryBuilder::new("mapper");
		let builder = match &self.pool {
			Some(defs) => builder.extend(defs.iter().copied()),
			None => builder.extend_inventory(),
		};
		let registry = self
			.bindings
			.iter()
			.fold(builder, |builder, (base, namespace)| builder.bind(*base, namespace))
			.build()?;
		check_tag_property(&registry, &self.property)?;

		let creators =
			CreatorSelectionPolicy::new(ParameterNameResolver::new(Arc::clone(&self.names)));
		let mapper = Mapper::new(
			Some(TypeResolver::new(registry, self.property.clone())),
			creators,
			self.settings.clone(),
		);
		self.built = Some((self.bindings.len(), mapper.clone()));
		Ok(mapper)
	}

	fn invalidate(&mut self) {
		self.built = None;
	}
}

/// Typed configuration with no pending base types.
pub struct TypedJson {
	assembly: Assembly,
}

/// Typed configuration with base types waiting for a namespace.
pub struct To {
	assembly: Assembly,
	pending: Vec<&'static BaseDef>,
}

/// Typed configuration right after binding a namespace.
pub struct In {
	assembly: Assembly,
}

/// Rejects subtypes with a creator parameter named like the tag property; the
/// tag would shadow it on write.
fn check_tag_property(registry: &TypeRegistry, property: &str) -> Result<()> {
	for base in registry.bases() {
		for def in registry.subtypes(base) {
			let clash = def
				.creators
				.iter()
				.filter_map(|creator| creator.params)
				.flatten()
				.any(|param| param.name == property);
			if clash {
				return Err(RegistryError::InvalidConfiguration(format!(
					"property `{property}` of {} clashes with the type tag property",
					def.qualified
				))
				.into());
			}
		}
	}
	Ok(())
}

fn to_all(mut assembly: Assembly, bases: &[&'static BaseDef]) -> To {
	if bases.is_empty() {
		assembly.reject("no base types given");
	}
	To {
		assembly,
		pending: bases.to_vec(),
	}
}

impl TypedJson {
	/// Declares base type `B`; its namespace comes next.
	pub fn to<B: BaseType + ?Sized>(self) -> To {
		To {
			assembly: self.assembly,
			pending: vec![B::base_def()],
		}
	}

	/// Declares several base types sharing the next namespace. An empty list
	/// makes `mapper()` fail with [`RegistryError::InvalidConfiguration`].
	pub fn to_all(self, bases: &[&'static BaseDef]) -> To {
		to_all(self.assembly, bases)
	}

	/// Replaces the engine settings.
	pub fn settings(mut self, settings: MapperSettings) -> Self {
		self.assembly.settings = settings;
		self.assembly.invalidate();
		self
	}

	/// Searches only `defs` for subtypes instead of every submitted descriptor.
	pub fn types<I: IntoIterator<Item = &'static TypeDef>>(mut self, defs: I) -> Self {
		self.assembly.pool = Some(defs.into_iter().collect());
		self.assembly.invalidate();
		self
	}

	/// Replaces the source of creator parameter names.
	pub fn parameter_names(mut self, source: impl ParameterNameSource + 'static) -> Self {
		self.assembly.names = Arc::new(source);
		self.assembly.invalidate();
		self
	}

	/// Finalizes the configuration.
	///
	/// # Errors
	///
	/// Configuration errors and tag ambiguities surface here, including a
	/// subtype property named like the tag property.
	pub fn mapper(&mut self) -> Result<Mapper> {
		self.assembly.finalize()
	}
}

impl To {
	/// Adds base type `B` to the pending set.
	pub fn and<B: BaseType + ?Sized>(mut self) -> Self {
		self.pending.push(B::base_def());
		self
	}

	/// Binds every pending base type under `namespace` (`""` for the default
	/// namespace, which applies no scoping).
	pub fn in_namespace(mut self, namespace: &str) -> In {
		for base in self.pending {
			self.assembly.bind(base, namespace);
		}
		In {
			assembly: self.assembly,
		}
	}

	/// Binds every pending base type under its own namespace and finalizes.
	pub fn mapper(&mut self) -> Result<Mapper> {
		for base in self.pending.drain(..) {
			self.assembly.bind(base, base.namespace);
		}
		self.assembly.finalize()
	}
}

impl In {
	/// Declares base type `B`; its namespace comes next.
	pub fn to<B: BaseType + ?Sized>(self) -> To {
		To {
			assembly: self.assembly,
			pending: vec![B::base_def()],
		}
	}

	/// Declares several base types sharing the next namespace. An empty list
	/// makes `mapper()` fail with [`RegistryError::InvalidConfiguration`].
	pub fn to_all(self, bases: &[&'static BaseDef]) -> To {
		to_all(self.assembly, bases)
	}

	/// Finalizes the configuration.
	pub fn mapper(&mut self) -> Result<Mapper> {
		self.assembly.finalize()
	}
}

/// Untyped configuration.
pub struct UntypedJson {
	names: Arc<dyn ParameterNameSource>,
	settings: MapperSettings,
	built: Option<Mapper>,
}

impl UntypedJson {
	/// Replaces the engine settings.
	pub fn settings(mut self, settings: MapperSettings) -> Self {
		self.settings = settings;
		self.built = None;
		self
	}

	/// Replaces the source of creator parameter names.
	pub fn parameter_names(mut self, source: impl ParameterNameSource + 'static) -> Self {
		self.names = Arc::new(source);
		self.built = None;
		self
	}

	/// Finalizes the configuration; repeated calls return the same handle.
	pub fn mapper(&mut self) -> Mapper {
		self.built
			.get_or_insert_with(|| {
				let creators =
					CreatorSelectionPolicy::new(ParameterNameResolver::new(Arc::clone(&self.names)));
				Mapper::new(None, creators, self.settings.clone())
			})
			.clone()
	}
}
