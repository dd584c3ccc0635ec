//! Constructor ("creator") selection by parameter name.
//!
//! For a target type the policy keeps every creator whose parameter names can
//! be resolved. Reading picks, among the creators whose required parameters
//! are all present, the one with the most parameters; ties go to the earliest
//! declared. Properties are bound by name and absent optional ones become
//! `null`. There is no positional fallback.
//!
//! Descriptors are computed once per target type and cached for the lifetime
//! of the policy.

pub mod names;

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::RwLock;
use polytag_registry::{AnyBox, CreateFn, ParamDef, TypeDef};
use rustc_hash::FxHashMap as HashMap;
use serde_json::{Map, Value};

use self::names::ParameterNameResolver;
use crate::{Error, MapperSettings, Result};

/// A creator whose parameter names are known.
#[derive(Debug, Clone, Copy)]
pub struct CreatorCandidate {
	/// Position among the type's creators.
	pub index: usize,
	/// Parameters in declaration order.
	pub params: &'static [ParamDef],
	/// Factory taking one argument per parameter.
	pub create: CreateFn,
}

impl CreatorCandidate {
	/// Returns the number of parameters.
	pub fn arity(&self) -> usize {
		self.params.len()
	}

	/// Returns true if every required parameter is present in `properties`.
	pub fn accepts(&self, properties: &Map<String, Value>) -> bool {
		self.missing(properties).next().is_none()
	}

	/// Returns the required parameters absent from `properties`.
	pub fn missing<'a>(
		&'a self,
		properties: &'a Map<String, Value>,
	) -> impl Iterator<Item = &'static str> + 'a {
		self.params
			.iter()
			.filter(|p| p.required && !properties.contains_key(p.name))
			.map(|p| p.name)
	}

	/// Moves the property of each parameter out of `properties`, in parameter
	/// order. Absent parameters receive `null`.
	pub fn bind(&self, properties: &mut Map<String, Value>) -> Vec<Value> {
		self.params
			.iter()
			.map(|p| properties.remove(p.name).unwrap_or(Value::Null))
			.collect()
	}
}

/// Usable creators of one target type.
#[derive(Debug)]
pub struct CreatorDescriptor {
	pub target: &'static TypeDef,
	/// Candidates in declaration order.
	pub candidates: Vec<CreatorCandidate>,
}

impl CreatorDescriptor {
	/// Returns the candidate with the most parameters, earliest on ties.
	pub fn widest(&self) -> Option<&CreatorCandidate> {
		widest(self.candidates.iter())
	}

	/// Selects the creator to invoke for `properties`.
	///
	/// # Errors
	///
	/// [`Error::NoUsableConstructor`] when no creator exposes parameter names or
	/// every creator misses a required property.
	pub fn select(&self, properties: &Map<String, Value>) -> Result<&CreatorCandidate> {
		if self.candidates.is_empty() {
			return Err(Error::NoUsableConstructor {
				type_name: self.target.qualified,
				reason: "no constructor exposes parameter names".to_string(),
			});
		}

		if let Some(candidate) = widest(self.candidates.iter().filter(|c| c.accepts(properties))) {
			return Ok(candidate);
		}

		let missing = self
			.candidates
			.iter()
			.map(|c| c.missing(properties).collect::<Vec<_>>())
			.min_by_key(Vec::len)
			.unwrap_or_default();
		Err(Error::NoUsableConstructor {
			type_name: self.target.qualified,
			reason: format!("missing required properties: {}", missing.join(", ")),
		})
	}

	/// Returns true if some creator has a parameter named `property`.
	pub fn knows(&self, property: &str) -> bool {
		self.candidates
			.iter()
			.any(|c| c.params.iter().any(|p| p.name == property))
	}
}

fn widest<'a, I>(candidates: I) -> Option<&'a CreatorCandidate>
where
	I: Iterator<Item = &'a CreatorCandidate>,
{
	candidates.fold(None, |best, c| match best {
		Some(b) if b.arity() >= c.arity() => Some(b),
		_ => Some(c),
	})
}

/// Picks and invokes creators, caching one [`CreatorDescriptor`] per type.
pub struct CreatorSelectionPolicy {
	names: ParameterNameResolver,
	cache: RwLock<HashMap<TypeId, Arc<CreatorDescriptor>>>,
}

impl CreatorSelectionPolicy {
	pub fn new(names: ParameterNameResolver) -> Self {
		Self {
			names,
			cache: RwLock::new(HashMap::default()),
		}
	}

	/// Returns the cached descriptor of `target`, computing it on first use.
	///
	/// Concurrent first use may compute the descriptor twice; the first
	/// insert wins.
	pub fn descriptor(&self, target: &'static TypeDef) -> Arc<CreatorDescriptor> {
		let id = target.id();
		if let Some(descriptor) = self.cache.read().get(&id) {
			return Arc::clone(descriptor);
		}

		let computed = Arc::new(self.compute(target));
		Arc::clone(self.cache.write().entry(id).or_insert(computed))
	}

	fn compute(&self, target: &'static TypeDef) -> CreatorDescriptor {
		let candidates: Vec<_> = target
			.creators
			.iter()
			.enumerate()
			.filter_map(|(index, creator)| {
				let params = self.names.resolve(target, index, creator)?;
				Some(CreatorCandidate {
					index,
					params,
					create: creator.create,
				})
			})
			.collect();

		tracing::debug!(
			domain = "creator",
			type_name = target.qualified,
			creators = target.creators.len(),
			usable = candidates.len(),
			"computed creator descriptor"
		);

		CreatorDescriptor { target, candidates }
	}

	/// Returns the parameters of the widest usable creator of `target`.
	pub fn property_order(&self, target: &'static TypeDef) -> &'static [ParamDef] {
		self.descriptor(target)
			.widest()
			.map(|c| c.params)
			.unwrap_or_default()
	}

	/// Constructs `target` from `properties`.
	///
	/// Properties consumed by no parameter are ignored, unless
	/// `settings.fail_on_unknown_properties` is set and no creator of the
	/// type names them.
	///
	/// # Errors
	///
	/// - [`Error::NoUsableConstructor`] when no creator can be selected.
	/// - [`Error::UnknownProperty`] in strict mode.
	/// - [`Error::Construct`] when the creator rejects its arguments.
	pub fn instantiate(
		&self,
		target: &'static TypeDef,
		mut properties: Map<String, Value>,
		settings: &MapperSettings,
	) -> Result<AnyBox> {
		let descriptor = self.descriptor(target);
		let creator = descriptor.select(&properties)?;
		let args = creator.bind(&mut properties);

		for property in properties.keys() {
			if settings.fail_on_unknown_properties && !descriptor.knows(property) {
				return Err(Error::UnknownProperty {
					type_name: target.qualified,
					property: property.clone(),
				});
			}
			tracing::trace!(
				domain = "creator",
				type_name = target.qualified,
				property = property.as_str(),
				"ignored property"
			);
		}

		(creator.create)(args).map_err(|source| Error::Construct {
			type_name: target.qualified,
			source,
		})
	}

	/// Returns the number of cached descriptors.
	pub fn cached(&self) -> usize {
		self.cache.read().len()
	}
}

impl Default for CreatorSelectionPolicy {
	fn default() -> Self {
		Self::new(ParameterNameResolver::default())
	}
}

impl std::fmt::Debug for CreatorSelectionPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CreatorSelectionPolicy")
			.field("cached", &self.cached())
			.finish_non_exhaustive()
	}
}
