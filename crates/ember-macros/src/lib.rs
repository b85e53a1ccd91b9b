// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural macros for the Ember engine.
//!
//! `#[derive(Reflect)]` turns a struct with named fields into a reflected
//! type (a `Reflect` value plus a registered `TypeDescriptor`), or a
//! field-less enum into a reflected enum value.
//!
//! Struct attributes:
//! * `#[reflect(variant)]` marks a component type: it gets the `Variant`
//!   base marker and a constructor using `Default`.
//! * `#[reflect(name = "Other")]` overrides the registered name.
//!
//! Field attributes:
//! * `#[reflect(skip)]` leaves the field out of reflection entirely.
//! * `#[reflect(no_serialize)]` keeps the property but never serializes it,
//!   also when the struct is nested inside another property. Writing a
//!   nested value back keeps the member's current state.
//! * `#[reflect(on_set = "method")]` calls `self.method()` after the property
//!   is set through reflection.
//!
//! Reflected structs must implement `Default`; missing members keep their
//! default value when a struct is rebuilt from a value.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

#[derive(Default)]
struct TypeOptions {
    variant: bool,
    name: Option<String>,
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    no_serialize: bool,
    on_set: Option<LitStr>,
}

fn parse_type_options(input: &DeriveInput) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("variant") {
                options.variant = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                options.name = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `variant` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(options)
}

fn parse_field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("no_serialize") {
                options.no_serialize = true;
                Ok(())
            } else if meta.path.is_ident("on_set") {
                options.on_set = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `skip`, `no_serialize` or `on_set = \"...\"`"))
            }
        })?;
    }
    Ok(options)
}

/// Derives `ember_core::reflect::Reflect` (and, for structs,
/// `ember_core::reflect::Reflected` plus a static type registration).
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match expand(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    };

    TokenStream::from(expanded)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "reflected types cannot be generic",
        ));
    }

    let options = parse_type_options(input)?;
    let type_name = options
        .name
        .clone()
        .unwrap_or_else(|| input.ident.to_string());

    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => expand_struct(input, &options, &type_name, fields),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "only structs with named fields can be reflected",
            )),
        },
        Data::Enum(data) => {
            if options.variant {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "enums cannot be component types",
                ));
            }
            expand_enum(input, &type_name, data)
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "unions cannot be reflected",
        )),
    }
}

fn expand_struct(
    input: &DeriveInput,
    options: &TypeOptions,
    type_name: &str,
    fields: &syn::FieldsNamed,
) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    let mut properties = Vec::new();
    let mut to_members = Vec::new();
    let mut from_members = Vec::new();
    let mut absorb_members = Vec::new();
    let mut callbacks: Vec<LitStr> = Vec::new();

    for field in &fields.named {
        let field_options = parse_field_options(field)?;
        if field_options.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.to_string();
        let ty = &field.ty;
        let no_serialize = field_options.no_serialize;
        let on_set = match &field_options.on_set {
            Some(method) => {
                if !callbacks.iter().any(|c| c.value() == method.value()) {
                    callbacks.push(method.clone());
                }
                quote! { ::core::option::Option::Some(#method) }
            }
            None => quote! { ::core::option::Option::None },
        };

        properties.push(quote! {
            .with_property(::ember_core::reflect::PropertyDescriptor {
                name: #field_name,
                kind: <#ty as ::ember_core::reflect::Reflect>::value_kind(),
                get: |instance| {
                    let this = ::ember_core::reflect::downcast_instance::<#ident>(instance, #type_name)?;
                    ::core::result::Result::Ok(
                        <#ty as ::ember_core::reflect::Reflect>::to_value(&this.#field_ident),
                    )
                },
                set: |instance, value| {
                    let this = ::ember_core::reflect::downcast_instance_mut::<#ident>(instance, #type_name)?;
                    <#ty as ::ember_core::reflect::Reflect>::assign_value(&mut this.#field_ident, value)
                },
                metadata: ::ember_core::reflect::PropertyMetadata {
                    no_serialize: #no_serialize,
                    on_set: #on_set,
                },
            })
        });

        if no_serialize {
            continue;
        }

        to_members.push(quote! {
            (
                ::std::string::String::from(#field_name),
                <#ty as ::ember_core::reflect::Reflect>::to_value(&self.#field_ident),
            )
        });

        from_members.push(quote! {
            #field_name => {
                out.#field_ident = <#ty as ::ember_core::reflect::Reflect>::from_value(member_value)
                    .map_err(|e| e.in_member(#field_name))?;
            }
        });

        absorb_members.push(quote! {
            <#ty as ::ember_core::reflect::Reflect>::absorb(&mut self.#field_ident, fresh.#field_ident);
        });
    }

    let methods = callbacks.iter().map(|method| {
        let method_ident = Ident::new(&method.value(), method.span());
        quote! {
            .with_method(::ember_core::reflect::MethodDescriptor {
                name: #method,
                invoke: |instance| {
                    ::ember_core::reflect::downcast_instance_mut::<#ident>(instance, #type_name)?
                        .#method_ident();
                    ::core::result::Result::Ok(())
                },
            })
        }
    });

    let variant_parts = if options.variant {
        quote! {
            .with_base(::ember_core::reflect::VARIANT_BASE)
            .with_constructor(|_info| {
                let instance: ::std::boxed::Box<dyn ::ember_core::variant::Variant> =
                    ::std::boxed::Box::new(<#ident as ::core::default::Default>::default());
                instance
            })
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl ::ember_core::reflect::Reflect for #ident {
            fn value_kind() -> ::ember_core::reflect::ValueKind {
                ::ember_core::reflect::ValueKind::Object(#type_name)
            }

            fn to_value(&self) -> ::ember_core::reflect::Value {
                ::ember_core::reflect::Value::Object(::std::vec![#(#to_members),*])
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(
                value: ::ember_core::reflect::Value,
            ) -> ::core::result::Result<Self, ::ember_core::reflect::ReflectError> {
                match value {
                    ::ember_core::reflect::Value::Object(members) => {
                        let mut out = <Self as ::core::default::Default>::default();
                        for (member, member_value) in members {
                            match member.as_str() {
                                #(#from_members)*
                                _ => {}
                            }
                        }
                        ::core::result::Result::Ok(out)
                    }
                    other => ::core::result::Result::Err(
                        ::ember_core::reflect::ReflectError::TypeMismatch {
                            expected: "object",
                            found: other.kind_name(),
                        },
                    ),
                }
            }

            #[allow(unused_variables)]
            fn absorb(&mut self, fresh: Self) {
                #(#absorb_members)*
            }
        }

        impl ::ember_core::reflect::Reflected for #ident {
            const TYPE_NAME: &'static str = #type_name;

            fn type_descriptor() -> ::ember_core::reflect::TypeDescriptor {
                ::ember_core::reflect::TypeDescriptor::new(#type_name)
                    #variant_parts
                    #(#properties)*
                    #(#methods)*
            }
        }

        ::ember_core::inventory::submit! {
            ::ember_core::reflect::TypeRegistration::new(
                <#ident as ::ember_core::reflect::Reflected>::type_descriptor
            )
        }
    })
}

fn expand_enum(
    input: &DeriveInput,
    type_name: &str,
    data: &syn::DataEnum,
) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    let mut names = Vec::new();
    let mut idents = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "only field-less enums can be reflected",
            ));
        }
        names.push(variant.ident.to_string());
        idents.push(&variant.ident);
    }

    Ok(quote! {
        impl ::ember_core::reflect::Reflect for #ident {
            fn value_kind() -> ::ember_core::reflect::ValueKind {
                ::ember_core::reflect::ValueKind::Enum(#type_name)
            }

            fn to_value(&self) -> ::ember_core::reflect::Value {
                match self {
                    #(
                        Self::#idents => ::ember_core::reflect::Value::Enum {
                            name: ::core::option::Option::Some(::std::string::String::from(#names)),
                            value: Self::#idents as i64,
                        },
                    )*
                }
            }

            fn from_value(
                value: ::ember_core::reflect::Value,
            ) -> ::core::result::Result<Self, ::ember_core::reflect::ReflectError> {
                match value {
                    ::ember_core::reflect::Value::String(name)
                    | ::ember_core::reflect::Value::Enum {
                        name: ::core::option::Option::Some(name),
                        ..
                    } => match name.as_str() {
                        #( #names => ::core::result::Result::Ok(Self::#idents), )*
                        _ => ::core::result::Result::Err(
                            ::ember_core::reflect::ReflectError::UnknownEnumerator {
                                enum_name: #type_name,
                                name: name.clone(),
                            },
                        ),
                    },
                    other => {
                        let raw = other.as_i128().ok_or(
                            ::ember_core::reflect::ReflectError::TypeMismatch {
                                expected: "enum",
                                found: other.kind_name(),
                            },
                        )?;
                        #(
                            if raw == Self::#idents as i128 {
                                return ::core::result::Result::Ok(Self::#idents);
                            }
                        )*
                        ::core::result::Result::Err(
                            ::ember_core::reflect::ReflectError::UnknownEnumerator {
                                enum_name: #type_name,
                                name: raw.to_string(),
                            },
                        )
                    }
                }
            }
        }
    })
}
