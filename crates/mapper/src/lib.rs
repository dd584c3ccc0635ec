//! Tagged JSON mapping.
//!
//! - [`TypeResolver`] turns type tags into concrete types and back, on top of a
//!   [`TypeRegistry`](polytag_registry::TypeRegistry).
//! - [`CreatorSelectionPolicy`] picks and invokes a constructor by matching
//!   parameter names against JSON property names.
//! - [`typed_json`] and [`untyped_json`] assemble a configuration into a
//!   [`Mapper`], the engine handle used for reading and writing.

mod builder;
pub mod creator;
mod error;
mod mapper;
mod resolver;
mod settings;


pub use builder::{In, To, TypedJson, UntypedJson, typed_json, untyped_json};
pub use creator::names::{
	DescriptorNames, NamesUnavailable, ParameterNameResolver, ParameterNameSource,
};
pub use creator::{CreatorCandidate, CreatorDescriptor, CreatorSelectionPolicy};
pub use error::{Error, Result};
pub use mapper::Mapper;
pub use resolver::TypeResolver;
pub use settings::MapperSettings;
