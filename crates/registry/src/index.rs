//! Per-base-type tag registry.
//!
//! Provides [`TypeRegistryBuilder`] and [`TypeRegistry`]. Bindings of a base
//! type to a namespace prefix accumulate in the builder; [`build`] discovers
//! or takes the subtypes of each binding, derives their tags and fails fast on
//! ambiguity. The resulting registry is read-only.
//!
//! ```rust,ignore
//! let registry = TypeRegistryBuilder::new("mapper")
//!     .extend_inventory()
//!     .bind(<dyn Animal as BaseType>::base_def(), "org::pkg::animal")
//!     .bind(<dyn Person as BaseType>::base_def(), "")
//!     .build()?;
//! let cat = registry.resolve(<dyn Animal as BaseType>::base_def(), "Cat")?;
//! ```
//!
//! # Invariants
//!
//! - For one base type, a tag maps to exactly one concrete type. Two different
//!   types reducing to the same tag fail [`build`] with
//!   [`RegistryError::AmbiguousTypeTag`].
//! - The same type reached through several bindings of one base is registered once.
//!
//! [`build`]: TypeRegistryBuilder::build

use std::any::TypeId;

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::{BaseDef, RegistryError, TypeDef, inventory_types};

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// A base type bound under a namespace prefix.
#[derive(Debug, Clone)]
pub struct BaseTypeBinding {
	/// The bound base type.
	pub base: &'static BaseDef,
	/// Namespace prefix including the trailing separator, or empty for the
	/// default (unscoped) namespace.
	pub prefix: String,
}

impl BaseTypeBinding {
	/// Binds `base` under `namespace`, normalizing it to a prefix.
	pub fn new(base: &'static BaseDef, namespace: &str) -> Self {
		let prefix = if namespace.is_empty() || namespace.ends_with(NAMESPACE_SEPARATOR) {
			namespace.to_string()
		} else {
			format!("{namespace}{NAMESPACE_SEPARATOR}")
		};
		Self { base, prefix }
	}

	/// Returns the namespace without the trailing separator.
	pub fn namespace(&self) -> &str {
		self.prefix
			.strip_suffix(NAMESPACE_SEPARATOR)
			.unwrap_or(&self.prefix)
	}

	/// Returns true for the default namespace, which applies no scoping.
	pub fn is_unscoped(&self) -> bool {
		self.prefix.is_empty()
	}

	/// Returns true if `def` is searched under this binding.
	pub fn contains(&self, def: &TypeDef) -> bool {
		self.is_unscoped() || def.in_namespace(self.namespace())
	}

	/// Derives the tag of `def` under this binding.
	///
	/// Strips the prefix from the qualified name. Types outside the prefix
	/// (or in a nested namespace) fall back to their simple name.
	pub fn tag_for(&self, def: &'static TypeDef) -> &'static str {
		match def.qualified.strip_prefix(self.prefix.as_str()) {
			Some(rest) if !rest.is_empty() && !rest.contains(NAMESPACE_SEPARATOR) => rest,
			_ => def.name,
		}
	}
}

impl PartialEq for BaseTypeBinding {
	fn eq(&self, other: &Self) -> bool {
		self.base.id() == other.base.id() && self.prefix == other.prefix
	}
}

impl Eq for BaseTypeBinding {}

enum Subtypes {
	/// Discover subtypes in the descriptor pool.
	Discover,
	/// Use exactly these subtypes.
	Explicit(Vec<&'static TypeDef>),
}

struct PendingBinding {
	binding: BaseTypeBinding,
	subtypes: Subtypes,
}

/// Builder for constructing a [`TypeRegistry`].
///
/// Collects descriptors into a pool, accumulates bindings, and validates the
/// resulting tag tables in [`build`](Self::build).
pub struct TypeRegistryBuilder {
	label: &'static str,
	pool: Vec<&'static TypeDef>,
	bindings: Vec<PendingBinding>,
}

impl TypeRegistryBuilder {
	/// Creates a new builder with the given label for diagnostics.
	pub fn new(label: &'static str) -> Self {
		Self {
			label,
			pool: Vec::new(),
			bindings: Vec::new(),
		}
	}

	/// Returns the number of bindings accumulated so far.
	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	/// Returns true if no bindings have been accumulated.
	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	/// Adds a single descriptor to the pool.
	pub fn push(mut self, def: &'static TypeDef) -> Self {
		self.pool.push(def);
		self
	}

	/// Adds multiple descriptors to the pool.
	pub fn extend<I: IntoIterator<Item = &'static TypeDef>>(mut self, defs: I) -> Self {
		self.pool.extend(defs);
		self
	}

	/// Adds every descriptor submitted via `inventory` to the pool.
	pub fn extend_inventory(mut self) -> Self {
		self.pool.extend(inventory_types());
		self
	}

	/// Binds `base` under `namespace`; subtypes are discovered in the pool.
	pub fn bind(mut self, base: &'static BaseDef, namespace: &str) -> Self {
		self.bindings.push(PendingBinding {
			binding: BaseTypeBinding::new(base, namespace),
			subtypes: Subtypes::Discover,
		});
		self
	}

	/// Binds `base` under `namespace` with an explicit set of subtypes.
	///
	/// Subtypes outside the namespace are accepted and tagged by simple name.
	pub fn register<I>(mut self, base: &'static BaseDef, namespace: &str, subtypes: I) -> Self
	where
		I: IntoIterator<Item = &'static TypeDef>,
	{
		self.bindings.push(PendingBinding {
			binding: BaseTypeBinding::new(base, namespace),
			subtypes: Subtypes::Explicit(subtypes.into_iter().collect()),
		});
		self
	}

	/// Builds the registry, deriving every tag and rejecting ambiguity.
	///
	/// # Errors
	///
	/// - [`RegistryError::AmbiguousTypeTag`] if two types under one base share a tag.
	/// - [`RegistryError::InvalidConfiguration`] if an explicit subtype does not
	///   extend its base.
	pub fn build(self) -> Result<TypeRegistry, RegistryError> {
		let label = self.label;

		let mut seen = HashSet::default();
		let mut pool = self.pool;
		pool.retain(|d| seen.insert(d.id()));
		pool.sort_by(|a, b| a.qualified.cmp(b.qualified));

		let mut bases: HashMap<TypeId, BaseEntry> = HashMap::default();
		let mut bindings = Vec::with_capacity(self.bindings.len());

		for PendingBinding { binding, subtypes } in self.bindings {
			let base = binding.base;
			let subtypes: Vec<&'static TypeDef> = match subtypes {
				Subtypes::Discover => pool
					.iter()
					.copied()
					.filter(|d| d.extends(base) && binding.contains(d))
					.collect(),
				Subtypes::Explicit(defs) => {
					if let Some(def) = defs.iter().find(|d| !d.extends(base)) {
						return Err(RegistryError::InvalidConfiguration(format!(
							"{} does not extend {}",
							def.qualified, base.name
						)));
					}
					defs
				}
			};

			if subtypes.is_empty() {
				tracing::warn!(
					domain = "registry",
					registry = label,
					base = base.name,
					namespace = binding.namespace(),
					"binding has no subtypes"
				);
			}

			let entry = bases
				.entry(base.id())
				.or_insert_with(|| BaseEntry::new(base));
			for def in subtypes {
				entry.insert(label, &binding, def)?;
			}
			if !entry.bindings.contains(&binding) {
				entry.bindings.push(binding.clone());
				bindings.push(binding);
			}
		}

		for entry in bases.values() {
			tracing::debug!(
				domain = "registry",
				registry = label,
				base = entry.base.name,
				bindings = entry.bindings.len(),
				tags = entry.by_tag.len(),
				"built type registry"
			);
		}

		Ok(TypeRegistry {
			label,
			bindings,
			bases,
		})
	}
}

/// Tag tables of one base type.
struct BaseEntry {
	base: &'static BaseDef,
	bindings: Vec<BaseTypeBinding>,
	subtypes: Vec<&'static TypeDef>,
	by_tag: HashMap<&'static str, &'static TypeDef>,
	by_type: HashMap<TypeId, &'static str>,
}

impl BaseEntry {
	fn new(base: &'static BaseDef) -> Self {
		Self {
			base,
			bindings: Vec::new(),
			subtypes: Vec::new(),
			by_tag: HashMap::default(),
			by_type: HashMap::default(),
		}
	}

	fn insert(
		&mut self,
		label: &'static str,
		binding: &BaseTypeBinding,
		def: &'static TypeDef,
	) -> Result<(), RegistryError> {
		let tag = binding.tag_for(def);
		if let Some(&existing) = self.by_tag.get(tag) {
			if existing.id() == def.id() {
				return Ok(());
			}
			return Err(RegistryError::AmbiguousTypeTag {
				base: self.base.name,
				tag: tag.to_string(),
				first: existing.qualified,
				second: def.qualified,
			});
		}

		tracing::trace!(
			domain = "registry",
			registry = label,
			base = self.base.name,
			tag,
			type_name = def.qualified,
			"registered type tag"
		);
		self.by_tag.insert(tag, def);
		if !self.by_type.contains_key(&def.id()) {
			self.by_type.insert(def.id(), tag);
			self.subtypes.push(def);
		}
		Ok(())
	}
}

/// Frozen mapping between type tags and concrete subtypes, per base type.
///
/// Built via [`TypeRegistryBuilder`]; all lookups are O(1) reads and the
/// registry is safe to share across threads.
pub struct TypeRegistry {
	label: &'static str,
	bindings: Vec<BaseTypeBinding>,
	bases: HashMap<TypeId, BaseEntry>,
}

impl TypeRegistry {
	/// Returns the diagnostic label.
	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Resolves `tag` to a concrete subtype of `base`.
	///
	/// # Errors
	///
	/// [`RegistryError::UnknownTypeTag`] if no registered subtype carries the tag.
	pub fn resolve(&self, base: &BaseDef, tag: &str) -> Result<&'static TypeDef, RegistryError> {
		self.bases
			.get(&base.id())
			.and_then(|entry| entry.by_tag.get(tag).copied())
			.ok_or_else(|| RegistryError::UnknownTypeTag {
				base: base.name,
				tag: tag.to_string(),
			})
	}

	/// Returns the tag of `def` under `base`.
	///
	/// # Errors
	///
	/// [`RegistryError::UnregisteredSubtype`] if `def` was never registered under `base`.
	pub fn tag_of(&self, base: &BaseDef, def: &TypeDef) -> Result<&'static str, RegistryError> {
		self.bases
			.get(&base.id())
			.and_then(|entry| entry.by_type.get(&def.id()).copied())
			.ok_or(RegistryError::UnregisteredSubtype {
				base: base.name,
				type_name: def.qualified,
			})
	}

	/// Returns true if `base` has at least one binding.
	pub fn is_bound(&self, base: &BaseDef) -> bool {
		self.bases.contains_key(&base.id())
	}

	/// Returns all bindings in the order they were made.
	pub fn bindings(&self) -> &[BaseTypeBinding] {
		&self.bindings
	}

	/// Returns the bindings of `base` in the order they were made.
	pub fn bindings_for(&self, base: &BaseDef) -> &[BaseTypeBinding] {
		self.bases
			.get(&base.id())
			.map(|entry| entry.bindings.as_slice())
			.unwrap_or_default()
	}

	/// Returns the bound base types in binding order.
	pub fn bases(&self) -> impl Iterator<Item = &'static BaseDef> + '_ {
		let mut seen = HashSet::default();
		self.bindings
			.iter()
			.map(|b| b.base)
			.filter(move |base| seen.insert(base.id()))
	}

	/// Returns the registered subtypes of `base`, sorted by qualified name.
	pub fn subtypes(&self, base: &BaseDef) -> &[&'static TypeDef] {
		self.bases
			.get(&base.id())
			.map(|entry| entry.subtypes.as_slice())
			.unwrap_or_default()
	}

	/// Returns the number of `(base, tag)` entries.
	pub fn len(&self) -> usize {
		self.bases.values().map(|entry| entry.by_tag.len()).sum()
	}

	/// Returns true if no tag is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for TypeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeRegistry")
			.field("label", &self.label)
			.field("bindings", &self.bindings)
			.field("tags", &self.len())
			.finish()
	}
}

#[cfg(test)]
pub(crate) mod fixtures;
