//! Procedural macros for polytag.
//!
//! Provides `#[derive(Polymorphic)]`, which generates the static type
//! descriptor of a struct and submits it to the process-wide descriptor pool.

use proc_macro::TokenStream;

/// Polymorphic derive implementation.
mod polymorphic;

/// Derives the static descriptor of a struct with named fields.
///
/// ```ignore
/// #[derive(Polymorphic)]
/// #[polytag(extends(Animal), creator(Cat::named, name))]
/// pub struct Cat {
///     price: u32,
///     name: String,
///     nickname: Option<String>,
/// }
/// ```
///
/// Generates:
/// * a `TypeDef` static submitted to the descriptor pool
/// * `Described` and `Polymorphic` implementations
/// * one creator taking every field in declaration order, followed by the
///   creators listed in `creator(...)` attributes
///
/// # Type attributes
///
/// - `extends(A, B)` - base traits the type is registered under (each declared
///   with `base_type!`)
/// - `namespace = "a::b"` - namespace of the type, defaults to the module path
/// - `creator(path, field, ...)` - an additional constructor `fn(..) -> Self`
///   whose parameters are the named fields
///
/// # Field attributes
///
/// - `rename = "name"` - property name, defaults to the field name
/// - `default` - optional; absent or `null` properties take `Default::default()`
/// - `skip` - neither read nor written; initialized with `Default::default()`
///
/// `Option<T>` fields are optional parameters.
#[proc_macro_derive(Polymorphic, attributes(polytag))]
pub fn derive_polymorphic(input: TokenStream) -> TokenStream {
	polymorphic::derive_polymorphic(input)
}
