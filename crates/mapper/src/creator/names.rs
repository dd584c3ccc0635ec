//! Parameter-name lookup for creators.

use std::sync::Arc;

use polytag_registry::{CreatorDef, ParamDef, TypeDef};
use thiserror::Error;

/// Parameter names of a creator could not be determined.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("parameter names unavailable")]
pub struct NamesUnavailable;

/// Source of creator parameter names.
pub trait ParameterNameSource: Send + Sync {
	/// Returns the parameter names of `creator` in declaration order.
	fn parameter_names(
		&self,
		creator: &'static CreatorDef,
	) -> Result<&'static [ParamDef], NamesUnavailable>;
}

/// Reads parameter names from the creator descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorNames;

impl ParameterNameSource for DescriptorNames {
	fn parameter_names(
		&self,
		creator: &'static CreatorDef,
	) -> Result<&'static [ParamDef], NamesUnavailable> {
		creator.params.ok_or(NamesUnavailable)
	}
}

/// Resolves creator parameter names, treating unavailability as absence.
#[derive(Clone)]
pub struct ParameterNameResolver {
	source: Arc<dyn ParameterNameSource>,
}

impl ParameterNameResolver {
	pub fn new(source: Arc<dyn ParameterNameSource>) -> Self {
		Self { source }
	}

	/// Returns the names of creator `index` of `target`, or `None` when the
	/// source has none or they do not cover every parameter.
	pub fn resolve(
		&self,
		target: &TypeDef,
		index: usize,
		creator: &'static CreatorDef,
	) -> Option<&'static [ParamDef]> {
		match self.source.parameter_names(creator) {
			Ok(params) if params.len() == creator.arity => Some(params),
			Ok(params) => {
				tracing::trace!(
					domain = "creator",
					type_name = target.qualified,
					index,
					names = params.len(),
					arity = creator.arity,
					"parameter names do not cover the creator"
				);
				None
			}
			Err(NamesUnavailable) => {
				tracing::trace!(
					domain = "creator",
					type_name = target.qualified,
					index,
					"parameter names unavailable"
				);
				None
			}
		}
	}
}

impl Default for ParameterNameResolver {
	fn default() -> Self {
		Self::new(Arc::new(DescriptorNames))
	}
}

impl std::fmt::Debug for ParameterNameResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ParameterNameResolver").finish_non_exhaustive()
	}
}
