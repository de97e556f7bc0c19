//! Procedural macros for capmap.
//!
//! Provides `#[derive(Captures)]`, which generates the accessor table the
//! mapper uses to write capture groups into a struct, or the by-name
//! conversion for a C-like enum.
//!
//! # Attributes
//!
//! - `#[capture(skip)]` on a field: not writable from group names
//! - `#[capture(name = "...")]` on a field or variant: use a custom name
//! - `#[capture(factory = "path")]` on an `Option<T>` field: construct `T`
//!   with `path() -> Result<T, E>` when a nested path reaches it unset
//! - `#[capture(rename_all = "PascalCase")]` on the container
//! - `#[capture(no_default)]` on a struct without `Default`
//!
//! Only `pub` fields are writable.
//!
//! # Example
//!
//! ```ignore
//! use capmap::Captures;
//!
//! #[derive(Default, Captures)]
//! #[capture(rename_all = "PascalCase")]
//! pub struct Order {
//!     pub total: f64,
//!     pub customer: Option<Customer>,
//!     pub tags: Vec<String>,
//!     #[capture(skip)]
//!     pub audit: String,
//! }
//!
//! #[derive(Captures)]
//! pub enum Status {
//!     Open,
//!     #[capture(name = "closed")]
//!     Closed = 5,
//! }
//! ```

mod derive_captures;
mod type_utils;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive `CaptureTarget` + `FieldSlot` for a struct, or `FromCapture` +
/// `FieldSlot` for a C-like enum.
///
/// # Field behaviour (decided by the field type's `FieldSlot` impl)
/// - scalars (`i32`, `f64`, `bool`, `String`, chrono types, derived enums, ...) → assigned
/// - `Vec<T>`, `VecDeque<T>`, `LinkedList<T>`, `BTreeSet<T>`, `HashSet<T>` → appended
/// - `Option<T>` → created on first write or descent
/// - other `#[derive(Captures)]` structs → descended into by `Outer__Inner` names
#[proc_macro_derive(Captures, attributes(capture))]
pub fn derive_captures(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_captures::derive_captures_impl(input)
}
