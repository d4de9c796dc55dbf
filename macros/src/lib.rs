//! Derive macros for composable stores
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Classifies the variants of an action enum as
//!   commands or events and generates helpers used for routing and logging
//!
//! # Example
//!
//! ```ignore
//! use composable_store_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[command]
//!     CreateTodo { text: String },
//!
//!     #[event]
//!     TodoCreated { id: String, text: String },
//! }
//!
//! assert!(TodoAction::CreateTodo { text: "test".into() }.is_command());
//! assert_eq!(TodoAction::CreateTodo { text: "test".into() }.action_name(), "CreateTodo");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Every variant must carry exactly one of `#[command]` or `#[event]`.
///
/// Generated methods:
/// - `is_command()` - true for `#[command]` variants
/// - `is_event()` - true for `#[event]` variants
/// - `action_name()` - the variant name, for log fields and metric labels
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]`
/// - A variant has neither
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut command_arms = Vec::new();
    let mut event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        match (is_command, is_event) {
            (true, true) => {
                return syn::Error::new_spanned(
                    variant,
                    "Variant cannot be both #[command] and #[event]",
                )
                .to_compile_error()
                .into();
            },
            (false, false) => {
                return syn::Error::new_spanned(
                    variant,
                    "Variant must be marked #[command] or #[event]",
                )
                .to_compile_error()
                .into();
            },
            _ => {},
        }

        let pattern = variant_pattern(variant);
        let variant_name = variant.ident.to_string();

        command_arms.push(quote! { #pattern => #is_command, });
        event_arms.push(quote! { #pattern => #is_event, });
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Returns true if this action is a command
            #[must_use]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_arms)*
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_arms)*
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern for a variant that ignores its fields
fn variant_pattern(variant: &Variant) -> TokenStream2 {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
