//! Argument decoding helpers for creator factories.
//!
//! Generated factories pull their arguments out of the positional list with
//! these functions, so a decoding failure names the offending property.

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

/// Positional creator arguments.
pub type Args = std::vec::IntoIter<Value>;

/// Decodes the next argument into `T`.
///
/// A missing argument decodes from `null`, so `Option<T>` parameters become `None`.
pub fn take<T: DeserializeOwned>(args: &mut Args, name: &str) -> Result<T, serde_json::Error> {
	let value = args.next().unwrap_or(Value::Null);
	serde_json::from_value(value).map_err(|e| serde_json::Error::custom(format!("property `{name}`: {e}")))
}

/// Decodes the next argument into `T`, falling back to `T::default()` on `null`.
pub fn take_or_default<T: DeserializeOwned + Default>(
	args: &mut Args,
	name: &str,
) -> Result<T, serde_json::Error> {
	match args.next() {
		None | Some(Value::Null) => Ok(T::default()),
		Some(value) => serde_json::from_value(value)
			.map_err(|e| serde_json::Error::custom(format!("property `{name}`: {e}"))),
	}
}

/// Encodes a property value.
pub fn put<T: serde::Serialize + ?Sized>(value: &T, name: &str) -> Result<Value, serde_json::Error> {
	serde_json::to_value(value).map_err(|e| serde_json::Error::custom(format!("property `{name}`: {e}")))
}
