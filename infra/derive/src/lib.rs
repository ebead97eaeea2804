#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the FleetDesk crates.
//!
//! * [`fleet_error`] turns a plain enum into the workspace's error shape.
//! * [`main`] boots an `async fn main` on a `fleetdesk-runtime` profile.
//!
//! Consumers depend on this crate directly (`fleetdesk-derive.workspace = true`).
//! The examples below are `ignore`d because a proc-macro crate cannot use itself.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap a `fleetdesk-runtime` profile.
///
/// Transforms an `async fn main` into a plain `fn main` that builds the runtime
/// and blocks on the body.
///
/// # Arguments
///
/// * `event_loop` - Single-threaded runtime for interactive drivers.
/// * `default` - Multi-threaded runtime sized from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[fleetdesk_runtime::main(event_loop)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for domain error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source type.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a source field.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
/// * **Kind Names**: Generates `kind(&self) -> &'static str` returning the variant name,
///   used as the `error.kind` field in structured logs.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. Context-aware variants declare `context: Option<Cow<'static, str>>`.
/// 3. Variants with a source (`source` field, `#[source]` or `#[from]`) must also
///    declare a context field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[fleetdesk_derive::fleet_error]
/// pub enum DraftError {
///     #[error("Serialization failure{}: {source}", format_context(.context))]
///     Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn encode(value: &serde_json::Value) -> Result<String, DraftError> {
///     serde_json::to_string(value).context("Encoding draft")
/// }
/// ```
#[proc_macro_attribute]
pub fn fleet_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
