//! Polymorphic JSON with short type tags.
//!
//! A document names its concrete type with a short tag such as `"Cat"`
//! instead of a fully qualified type name. Base types are traits declared with
//! [`base_type!`]; concrete types derive [`Polymorphic`] and are bound to their
//! base types per namespace when the mapper is configured. Constructors are
//! selected by matching their parameter names against the document's
//! properties.
//!
//! ```rust,ignore
//! use polytag::{Polymorphic, base_type, typed_json};
//!
//! pub trait Animal: polytag::Polymorphic {}
//! base_type!(Animal);
//!
//! #[derive(Polymorphic)]
//! #[polytag(extends(Animal))]
//! pub struct Cat {
//!     price: u32,
//!     name: String,
//!     nickname: Option<String>,
//! }
//! impl Animal for Cat {}
//!
//! let mapper = typed_json("type").to::<dyn Animal>().mapper()?;
//! let animal = mapper.read_base::<dyn Animal>(r#"{"type":"Cat","price":1,"name":"Bella"}"#)?;
//! assert_eq!(mapper.write_base(&*animal)?, r#"{"type":"Cat","price":1,"name":"Bella","nickname":null}"#);
//! ```

pub use polytag_macros::Polymorphic;
pub use polytag_mapper::{
	CreatorCandidate, CreatorDescriptor, CreatorSelectionPolicy, DescriptorNames, Error, In,
	Mapper, MapperSettings, NamesUnavailable, ParameterNameResolver, ParameterNameSource, Result,
	To, TypeResolver, TypedJson, UntypedJson, typed_json, untyped_json,
};
pub use polytag_registry::{
	AnyBox, BaseDef, BaseType, BaseTypeBinding, CreatorDef, Described, ParamDef, Polymorphic,
	RegistryError, SupertypeDef, TypeDef, TypeRegistry, TypeRegistryBuilder, base_type,
	inventory_types,
};

/// Support paths for code generated by `#[derive(Polymorphic)]`.
#[doc(hidden)]
pub mod __private {
	pub use core::any::{Any, TypeId};

	pub use polytag_registry::{
		AnyBox, BaseType, CreatorDef, Described, ParamDef, Polymorphic, SupertypeDef, TypeDef,
		TypeReg, args, inventory,
	};
	pub use serde_json::{self, Map, Value};
}
