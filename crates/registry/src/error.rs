use thiserror::Error;

/// Errors raised while configuring or consulting a [`TypeRegistry`].
///
/// [`TypeRegistry`]: crate::TypeRegistry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// Bad configuration input (empty base-type list, empty tag property,
	/// a registered type that does not extend its base, ...).
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),
	/// Two different concrete types under one base type reduce to the same tag.
	#[error("ambiguous type tag {tag:?} for base {base}: {first} and {second}")]
	AmbiguousTypeTag {
		base: &'static str,
		tag: String,
		first: &'static str,
		second: &'static str,
	},
	/// No registered subtype of the base type carries the tag.
	#[error("unknown type tag {tag:?} for base {base}")]
	UnknownTypeTag { base: &'static str, tag: String },
	/// The concrete type was never registered under the base type.
	#[error("{type_name} is not a registered subtype of {base}")]
	UnregisteredSubtype {
		base: &'static str,
		type_name: &'static str,
	},
}
