use polytag_registry::RegistryError;
use thiserror::Error;

/// Errors raised while reading or writing tagged JSON.
#[derive(Error, Debug)]
pub enum Error {
	/// Configuration or tag lookup failure.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// No creator of the target type can be invoked with the given properties.
	#[error("no usable constructor for {type_name}: {reason}")]
	NoUsableConstructor {
		type_name: &'static str,
		reason: String,
	},
	/// The document lacks the tag property, or its value is not a string.
	#[error("missing type tag property {property:?} for base {base}")]
	MissingTypeTag { base: &'static str, property: String },
	/// A property matches no creator parameter and unknown properties are rejected.
	#[error("unknown property {property:?} for {type_name}")]
	UnknownProperty {
		type_name: &'static str,
		property: String,
	},
	/// The tag of a concretely typed read names another type.
	#[error("type mismatch: expected {expected}, found tag {found:?}")]
	TypeMismatch { expected: &'static str, found: String },
	/// The document is not a JSON object.
	#[error("expected a JSON object for {type_name}, found {found}")]
	NotAnObject {
		type_name: &'static str,
		found: &'static str,
	},
	/// The selected creator rejected its arguments.
	#[error("failed to construct {type_name}: {source}")]
	Construct {
		type_name: &'static str,
		#[source]
		source: serde_json::Error,
	},
	/// A property of the value could not be encoded.
	#[error("failed to serialize {type_name}: {source}")]
	Serialize {
		type_name: &'static str,
		#[source]
		source: serde_json::Error,
	},
	/// A descriptor does not agree with the value it describes.
	#[error("descriptor mismatch for {type_name}: {detail}")]
	DescriptorMismatch {
		type_name: &'static str,
		detail: &'static str,
	},
	/// Malformed JSON text.
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Names the JSON kind of `value` for diagnostics.
pub(crate) fn kind(value: &serde_json::Value) -> &'static str {
	use serde_json::Value;
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
