//! Per-mapper engine settings.

use serde::{Deserialize, Serialize};

/// Engine settings installed into each mapper.
///
/// Every mapper carries its own copy; there are no process-wide defaults.
///
/// ```json
/// { "fail-on-unknown-properties": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MapperSettings {
	/// Reject properties that match no creator parameter instead of ignoring them.
	pub fail_on_unknown_properties: bool,
	/// Write properties whose value is `null`.
	pub write_null_properties: bool,
}

impl Default for MapperSettings {
	fn default() -> Self {
		Self {
			fail_on_unknown_properties: false,
			write_null_properties: true,
		}
	}
}

impl MapperSettings {
	/// Settings that reject unknown properties.
	pub fn strict() -> Self {
		Self {
			fail_on_unknown_properties: true,
			..Self::default()
		}
	}

	/// Loads settings from a JSON document; absent keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
