/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

#![forbid(unsafe_code)]

//! Tidings Macro Library
//!
//! Procedural macros for the Tidings message bus.
//!
//! # Payload Macro
//!
//! The [`tidings_payload`] macro prepares a type for use as a bus payload:
//!
//! ```ignore
//! #[tidings_payload]
//! pub struct OrderPlaced {
//!     pub id: u64,
//! }
//!
//! // A payload whose default value is written by hand
//! #[tidings_payload(no_default)]
//! pub struct Heartbeat {
//!     pub at: std::time::Instant,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Configuration options parsed from `#[tidings_payload(...)]` attributes.
#[derive(Default)]
struct PayloadConfig {
    /// Skip deriving Default (user will implement it manually).
    no_default: bool,
}

impl PayloadConfig {
    fn parse(attr: &TokenStream) -> Self {
        let mut config = Self::default();

        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            if part.trim() == "no_default" {
                config.no_default = true;
            }
        }

        config
    }
}

/// Derives the boilerplate a bus payload type needs.
///
/// Payloads are carried by pooled envelopes. `Bus::message::<T>()` needs
/// `T: Default` to fill a freshly allocated envelope, and `Message::payload_cloned`
/// needs `T: Clone`.
///
/// # Usage
///
/// ```ignore
/// use tidings_macro::tidings_payload;
///
/// #[tidings_payload]
/// pub struct Increment {
///     pub amount: u32,
/// }
/// ```
///
/// This expands to:
/// - `#[derive(Clone, Debug, Default)]` (only traits not already present)
/// - A compile-time assertion that the type is `Send + Sync + 'static`, which is
///   what the bus's `Payload` bound requires
///
/// # Options
///
/// ## `no_default`
///
/// Skip deriving `Default`, for types whose fields have no default or that want a
/// hand-written one. Such a payload can still be sent with `Bus::message_with`.
#[proc_macro_attribute]
pub fn tidings_payload(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = PayloadConfig::parse(&attr);

    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits = Vec::new();
        if !has_derive(&input, "Clone") {
            traits.push(quote!(Clone));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        if !config.no_default && !has_derive(&input, "Default") {
            traits.push(quote!(Default));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let assert_ident = quote::format_ident!("_AssertTidingsPayload_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
