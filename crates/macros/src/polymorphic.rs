//! Polymorphic derive implementation.
//!
//! Expands into an anonymous `const _: () = { ... };` block holding the
//! descriptor static, its creator, upcast and property functions, the trait
//! impls and the inventory submission. Generated code reaches the runtime
//! through `::polytag::__private` only.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Path, Type, parse_macro_input};

/// Entry point for the `#[derive(Polymorphic)]` macro.
pub fn derive_polymorphic(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	expand(&input)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

/// A struct field as seen by the descriptor.
struct Field {
	ident: Ident,
	ty: Type,
	property: String,
	optional: bool,
	default: bool,
	skip: bool,
}

impl Field {
	fn parse(field: &syn::Field) -> syn::Result<Self> {
		let Some(ident) = field.ident.clone() else {
			return Err(syn::Error::new_spanned(field, "Polymorphic requires named fields"));
		};

		let mut out = Self {
			property: ident.unraw().to_string(),
			ident,
			ty: field.ty.clone(),
			optional: is_option(&field.ty),
			default: false,
			skip: false,
		};

		for attr in polytag_attrs(&field.attrs) {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("default") {
					out.default = true;
					Ok(())
				} else if meta.path.is_ident("skip") {
					out.skip = true;
					Ok(())
				} else if meta.path.is_ident("rename") {
					let value: LitStr = meta.value()?.parse()?;
					out.property = value.value();
					Ok(())
				} else {
					Err(meta.error("unknown polytag field attribute"))
				}
			})?;
		}

		out.optional |= out.default;
		Ok(out)
	}

	/// `ParamDef` constructor expression.
	fn param_def(&self) -> TokenStream2 {
		let name = &self.property;
		if self.optional {
			quote!(__polytag::ParamDef::optional(#name))
		} else {
			quote!(__polytag::ParamDef::required(#name))
		}
	}

	/// Expression decoding the next argument into the field type.
	fn take(&self) -> TokenStream2 {
		let name = &self.property;
		let ty = &self.ty;
		if self.default {
			quote!(__polytag::args::take_or_default::<#ty>(&mut args, #name)?)
		} else {
			quote!(__polytag::args::take::<#ty>(&mut args, #name)?)
		}
	}
}

/// An additional constructor named in `creator(path, field, ...)`.
struct Creator {
	function: Path,
	params: Vec<Ident>,
}

#[derive(Default)]
struct TypeAttrs {
	extends: Vec<Path>,
	namespace: Option<LitStr>,
	creators: Vec<Creator>,
}

impl TypeAttrs {
	fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
		let mut out = Self::default();

		for attr in polytag_attrs(attrs) {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("extends") {
					meta.parse_nested_meta(|base| {
						out.extends.push(base.path.clone());
						Ok(())
					})
				} else if meta.path.is_ident("namespace") {
					out.namespace = Some(meta.value()?.parse()?);
					Ok(())
				} else if meta.path.is_ident("creator") {
					let mut function = None;
					let mut params = Vec::new();
					meta.parse_nested_meta(|entry| {
						if function.is_none() {
							function = Some(entry.path.clone());
							return Ok(());
						}
						let Some(ident) = entry.path.get_ident() else {
							return Err(entry.error("expected a field name"));
						};
						params.push(ident.clone());
						Ok(())
					})?;
					let Some(function) = function else {
						return Err(meta.error("creator requires a function path"));
					};
					out.creators.push(Creator { function, params });
					Ok(())
				} else {
					Err(meta.error("unknown polytag attribute"))
				}
			})?;
		}

		Ok(out)
	}
}

fn polytag_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
	attrs.iter().filter(|a| a.path().is_ident("polytag"))
}

fn is_option(ty: &Type) -> bool {
	let Type::Path(path) = ty else {
		return false;
	};
	path.qself.is_none()
		&& path
			.path
			.segments
			.last()
			.is_some_and(|segment| segment.ident == "Option")
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
	let Data::Struct(data) = &input.data else {
		return Err(syn::Error::new_spanned(
			input,
			"Polymorphic can only be derived for structs",
		));
	};
	if !input.generics.params.is_empty() {
		return Err(syn::Error::new_spanned(
			&input.generics,
			"Polymorphic cannot be derived for generic types",
		));
	}

	let attrs = TypeAttrs::parse(&input.attrs)?;
	let fields = match &data.fields {
		Fields::Named(named) => named
			.named
			.iter()
			.map(Field::parse)
			.collect::<syn::Result<Vec<_>>>()?,
		Fields::Unit => Vec::new(),
		Fields::Unnamed(_) => {
			return Err(syn::Error::new_spanned(
				&data.fields,
				"Polymorphic requires named fields",
			));
		}
	};

	let ty = &input.ident;
	let name = ty.unraw().to_string();

	let (namespace, qualified) = match &attrs.namespace {
		Some(namespace) if namespace.value().is_empty() => (quote!(""), quote!(#name)),
		Some(namespace) => {
			let qualified = format!("{}::{name}", namespace.value());
			(quote!(#namespace), quote!(#qualified))
		}
		None => (
			quote!(::core::module_path!()),
			quote!(::core::concat!(::core::module_path!(), "::", #name)),
		),
	};

	let params: Vec<&Field> = fields.iter().filter(|f| !f.skip).collect();

	// Creator 0 takes every non-skipped field in declaration order.
	let canonical_params = params.iter().map(|f| f.param_def());
	let canonical_arity = params.len();
	let construct = match &data.fields {
		Fields::Unit => quote!(#ty),
		_ => {
			let inits = fields.iter().map(|f| {
				let ident = &f.ident;
				if f.skip {
					quote!(#ident: ::core::default::Default::default())
				} else {
					let take = f.take();
					quote!(#ident: #take)
				}
			});
			quote!(#ty { #(#inits),* })
		}
	};

	let mut creator_fns = vec![quote! {
		#[allow(unused_mut, unused_variables)]
		fn __create_0(
			args: ::std::vec::Vec<__polytag::Value>,
		) -> ::core::result::Result<__polytag::AnyBox, __polytag::serde_json::Error> {
			let mut args = args.into_iter();
			let value: #ty = #construct;
			::core::result::Result::Ok(::std::boxed::Box::new(value))
		}
	}];
	let mut creator_defs = vec![quote! {
		__polytag::CreatorDef {
			params: ::core::option::Option::Some(&[#(#canonical_params),*]),
			arity: #canonical_arity,
			create: __create_0,
		}
	}];

	for (index, creator) in attrs.creators.iter().enumerate() {
		let mut lets = Vec::with_capacity(creator.params.len());
		let mut vars = Vec::with_capacity(creator.params.len());
		let mut param_defs = Vec::with_capacity(creator.params.len());

		for (position, param) in creator.params.iter().enumerate() {
			let Some(field) = fields.iter().find(|f| f.ident.unraw() == param.unraw()) else {
				return Err(syn::Error::new_spanned(
					param,
					format!("`{name}` has no field named `{param}`"),
				));
			};
			if field.skip {
				return Err(syn::Error::new_spanned(
					param,
					"skipped fields cannot be creator parameters",
				));
			}

			let var = format_ident!("__arg{}", position);
			let field_ty = &field.ty;
			let take = field.take();
			lets.push(quote!(let #var: #field_ty = #take;));
			vars.push(var);
			param_defs.push(field.param_def());
		}

		let create = format_ident!("__create_{}", index + 1);
		let function = &creator.function;
		let arity = creator.params.len();
		creator_fns.push(quote! {
			#[allow(unused_mut, unused_variables)]
			fn #create(
				args: ::std::vec::Vec<__polytag::Value>,
			) -> ::core::result::Result<__polytag::AnyBox, __polytag::serde_json::Error> {
				let mut args = args.into_iter();
				#(#lets)*
				let value: #ty = #function(#(#vars),*);
				::core::result::Result::Ok(::std::boxed::Box::new(value))
			}
		});
		creator_defs.push(quote! {
			__polytag::CreatorDef {
				params: ::core::option::Option::Some(&[#(#param_defs),*]),
				arity: #arity,
				create: #create,
			}
		});
	}

	let mut upcast_fns = Vec::with_capacity(attrs.extends.len());
	let mut supertype_defs = Vec::with_capacity(attrs.extends.len());
	for (index, base) in attrs.extends.iter().enumerate() {
		let upcast = format_ident!("__upcast_{}", index);
		upcast_fns.push(quote! {
			fn #upcast(
				value: __polytag::AnyBox,
			) -> ::core::result::Result<__polytag::AnyBox, __polytag::AnyBox> {
				let value: ::std::boxed::Box<#ty> = value.downcast::<#ty>()?;
				let value: ::std::boxed::Box<dyn #base> = value;
				::core::result::Result::Ok(::std::boxed::Box::new(value))
			}
		});
		supertype_defs.push(quote! {
			__polytag::SupertypeDef {
				base: <dyn #base as __polytag::BaseType>::base_def,
				upcast: #upcast,
			}
		});
	}

	let writes = params.iter().map(|f| {
		let ident = &f.ident;
		let property = &f.property;
		quote! {
			map.insert(
				::std::string::String::from(#property),
				__polytag::args::put(&value.#ident, #property)?,
			);
		}
	});

	Ok(quote! {
		const _: () = {
			use ::polytag::__private as __polytag;

			#(#creator_fns)*

			#(#upcast_fns)*

			#[allow(unused_mut, unused_variables)]
			fn __write(
				value: &#ty,
			) -> ::core::result::Result<
				__polytag::Map<::std::string::String, __polytag::Value>,
				__polytag::serde_json::Error,
			> {
				let mut map = __polytag::Map::new();
				#(#writes)*
				::core::result::Result::Ok(map)
			}

			fn __properties(
				value: &dyn __polytag::Any,
			) -> ::core::option::Option<
				::core::result::Result<
					__polytag::Map<::std::string::String, __polytag::Value>,
					__polytag::serde_json::Error,
				>,
			> {
				value.downcast_ref::<#ty>().map(__write)
			}

			static __DEF: __polytag::TypeDef = __polytag::TypeDef {
				name: #name,
				namespace: #namespace,
				qualified: #qualified,
				type_id: __polytag::TypeId::of::<#ty>,
				supertypes: &[#(#supertype_defs),*],
				creators: &[#(#creator_defs),*],
				properties: __properties,
			};

			impl __polytag::Described for #ty {
				fn descriptor() -> &'static __polytag::TypeDef {
					&__DEF
				}
			}

			impl __polytag::Polymorphic for #ty {
				fn type_def(&self) -> &'static __polytag::TypeDef {
					&__DEF
				}

				fn as_any(&self) -> &dyn __polytag::Any {
					self
				}
			}

			__polytag::inventory::submit! {
				__polytag::TypeReg(&__DEF)
			}
		};
	})
}
