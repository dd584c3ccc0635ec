//! Static type descriptors and the per-base-type tag registry.
//!
//! Every concrete type that takes part in tagged JSON mapping publishes a
//! [`TypeDef`], usually generated by `#[derive(Polymorphic)]` and submitted to a
//! process-wide pool via `inventory`. Base types (trait object types such as
//! `dyn Animal`) publish a [`BaseDef`] via [`base_type!`].
//!
//! A [`TypeRegistry`] maps, for each bound base type, type tags to concrete
//! subtypes. It is built once by [`TypeRegistryBuilder`] and is read-only
//! afterwards.
//!
//! # Tags
//!
//! A base type is bound under a namespace prefix. The tag of a subtype is its
//! qualified name with the prefix removed, or its simple name when the type
//! lives outside the prefix. The default (empty) namespace searches every
//! namespace and tags by simple name.

pub mod args;
mod def;
mod error;
mod index;

pub use def::{
	AnyBox, BaseDef, BaseType, CreateFn, CreatorDef, Described, ParamDef, Polymorphic,
	PropertiesFn, SupertypeDef, TypeDef, TypeReg, UpcastFn, inventory_types,
};
pub use error::RegistryError;
pub use index::{BaseTypeBinding, NAMESPACE_SEPARATOR, TypeRegistry, TypeRegistryBuilder};
// Re-exported for generated `inventory::submit!` blocks.
#[doc(hidden)]
pub use inventory;
