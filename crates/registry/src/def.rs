//! Static type descriptors.
//!
//! Rust has no runtime reflection, so every type that takes part in tagged
//! JSON mapping publishes a [`TypeDef`]: its simple name, namespace, the base
//! types it extends, its constructors ("creators") with their parameter names,
//! and a function writing its properties. Descriptors are either generated by
//! `#[derive(Polymorphic)]` or written by hand as `static` items.

use std::any::{Any, TypeId};

use serde_json::{Map, Value};

/// A boxed, type-erased value produced by a creator.
pub type AnyBox = Box<dyn Any + Send + Sync>;

/// Constructs a value from arguments bound positionally to the creator's parameters.
///
/// Absent optional properties arrive as [`Value::Null`].
pub type CreateFn = fn(Vec<Value>) -> Result<AnyBox, serde_json::Error>;

/// Writes the properties of a value into a JSON map.
///
/// Returns `None` when the value is not of the descriptor's type.
pub type PropertiesFn = fn(&dyn Any) -> Option<Result<Map<String, Value>, serde_json::Error>>;

/// Turns a boxed concrete value into a boxed `Box<dyn Base>`, still type-erased.
///
/// Hands the input back unchanged when it is not of the descriptor's type.
pub type UpcastFn = fn(AnyBox) -> Result<AnyBox, AnyBox>;

/// Describes a base type, normally a trait object type such as `dyn Animal`.
#[derive(Debug)]
pub struct BaseDef {
	/// Simple name of the base type.
	pub name: &'static str,
	/// Namespace the base type was declared in; used when a binding derives
	/// its prefix from the base type itself.
	pub namespace: &'static str,
	/// Identity of the base type (`TypeId::of::<dyn Base>()`).
	pub type_id: fn() -> TypeId,
}

impl BaseDef {
	/// Returns the identity of the base type.
	#[inline]
	pub fn id(&self) -> TypeId {
		(self.type_id)()
	}
}

/// Declares that a concrete type extends a base type.
pub struct SupertypeDef {
	/// Descriptor of the base type.
	pub base: fn() -> &'static BaseDef,
	/// Converts a boxed concrete value into a boxed `Box<dyn Base>`.
	pub upcast: UpcastFn,
}

impl std::fmt::Debug for SupertypeDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("SupertypeDef").field(&(self.base)().name).finish()
	}
}

/// A named constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDef {
	/// Parameter name, matched against JSON property names.
	pub name: &'static str,
	/// Whether the property must be present for the creator to be selected.
	pub required: bool,
}

impl ParamDef {
	/// A parameter whose property must be present.
	pub const fn required(name: &'static str) -> Self {
		Self {
			name,
			required: true,
		}
	}

	/// A parameter that receives `null` (or its default) when absent.
	pub const fn optional(name: &'static str) -> Self {
		Self {
			name,
			required: false,
		}
	}
}

/// A constructor of a concrete type.
pub struct CreatorDef {
	/// Parameter names in declaration order, or `None` when they are not available.
	pub params: Option<&'static [ParamDef]>,
	/// Number of parameters.
	pub arity: usize,
	/// Factory invoked with one argument per parameter.
	pub create: CreateFn,
}

impl std::fmt::Debug for CreatorDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CreatorDef")
			.field("params", &self.params)
			.field("arity", &self.arity)
			.finish_non_exhaustive()
	}
}

/// Descriptor of a concrete, constructible type.
pub struct TypeDef {
	/// Simple name, the default type tag (e.g. `"Cat"`).
	pub name: &'static str,
	/// Namespace (e.g. `"org::pkg::animal"`), empty for the default namespace.
	pub namespace: &'static str,
	/// `namespace::name`, or `name` alone in the default namespace.
	pub qualified: &'static str,
	/// Identity of the concrete type.
	pub type_id: fn() -> TypeId,
	/// Base types this type extends.
	pub supertypes: &'static [SupertypeDef],
	/// Constructors in declaration order.
	pub creators: &'static [CreatorDef],
	/// Writes the properties of an instance.
	pub properties: PropertiesFn,
}

impl TypeDef {
	/// Returns the identity of the concrete type.
	#[inline]
	pub fn id(&self) -> TypeId {
		(self.type_id)()
	}

	/// Returns the supertype entry for `base`, if this type extends it.
	pub fn supertype(&self, base: &BaseDef) -> Option<&'static SupertypeDef> {
		let base_id = base.id();
		self.supertypes.iter().find(|s| (s.base)().id() == base_id)
	}

	/// Returns true if this type declares `base` as a supertype.
	pub fn extends(&self, base: &BaseDef) -> bool {
		self.supertype(base).is_some()
	}

	/// Returns true if this type lives in exactly the given namespace.
	pub fn in_namespace(&self, namespace: &str) -> bool {
		self.namespace == namespace
	}
}

impl std::fmt::Debug for TypeDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypeDef")
			.field("qualified", &self.qualified)
			.field("supertypes", &self.supertypes)
			.field("creators", &self.creators)
			.finish_non_exhaustive()
	}
}

/// A concrete type with a static descriptor.
pub trait Described: Any + Send + Sync + Sized {
	/// Returns the descriptor of this type.
	fn descriptor() -> &'static TypeDef;
}

/// Runtime access to the descriptor of a value behind a base type.
///
/// Base traits declare this as a supertrait (`trait Animal: Polymorphic`) so
/// that `dyn Animal` values can report their concrete type.
pub trait Polymorphic: Any + Send + Sync {
	/// Returns the descriptor of the value's concrete type.
	fn type_def(&self) -> &'static TypeDef;

	/// Returns the value as [`Any`] for descriptor functions.
	fn as_any(&self) -> &dyn Any;
}

/// A base type of a registered hierarchy, implemented for `dyn Trait` via [`base_type!`].
///
/// [`base_type!`]: crate::base_type
pub trait BaseType: 'static {
	/// Returns the descriptor of this base type.
	fn base_def() -> &'static BaseDef;
}

/// Registry wrapper collected via `inventory`, standing in for a class path.
pub struct TypeReg(pub &'static TypeDef);

inventory::collect!(TypeReg);

/// Returns every descriptor submitted to the process-wide pool.
pub fn inventory_types() -> impl Iterator<Item = &'static TypeDef> {
	inventory::iter::<TypeReg>.into_iter().map(|reg| reg.0)
}

/// Declares a trait as a base type of a registered hierarchy.
///
/// ```ignore
/// pub trait Animal: Polymorphic {}
/// base_type!(Animal);
/// base_type!(Animal, namespace = "org::pkg::animal");
/// ```
#[macro_export]
macro_rules! base_type {
	($trait:ident) => {
		$crate::base_type!($trait, namespace = ::core::module_path!());
	};
	($trait:ident, namespace = $namespace:expr) => {
		impl $crate::BaseType for dyn $trait {
			fn base_def() -> &'static $crate::BaseDef {
				static DEF: $crate::BaseDef = $crate::BaseDef {
					name: ::core::stringify!($trait),
					namespace: $namespace,
					type_id: || ::std::any::TypeId::of::<dyn $trait>(),
				};
				&DEF
			}
		}
	};
}
