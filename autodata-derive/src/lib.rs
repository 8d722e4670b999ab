//! Derive macros for the autodata specimen library
//!
//! This crate provides `#[derive(Specimen)]`, which lets a fixture create
//! instances of user types out of specimens of their fields.

use proc_macro::TokenStream;

mod derive;

/// Derive macro for implementing `autodata::Specimen`
///
/// Every field is requested from the fixture, so injected values,
/// registered factories and the recursion limit apply to fields too.
///
/// # Basic Usage
///
/// ```rust
/// use autodata::{Fixture, Specimen};
///
/// #[derive(Debug, Specimen)]
/// struct Customer {
///     id: u32,
///     name: String,
///     active: bool,
/// }
///
/// let customer: Customer = Fixture::new().create().unwrap();
/// assert!(customer.name.starts_with("name"));
/// ```
///
/// Named fields are requested with their field name, so generated strings
/// carry it as a prefix.
///
/// # Field Attributes
///
/// ```rust
/// use autodata::{DataError, Specimen, SpecimenContext};
///
/// #[derive(Debug, Specimen)]
/// struct Invoice {
///     #[specimen(with = "invoice_number")]
///     number: String,
///     #[specimen(default)]
///     notes: Vec<String>,
/// }
///
/// fn invoice_number(ctx: &mut SpecimenContext<'_>) -> Result<String, DataError> {
///     Ok(format!("INV-{:05}", ctx.create::<u16>()?))
/// }
/// ```
///
/// - `with = "path"`: call `path(&mut SpecimenContext) -> Result<FieldType, DataError>`
/// - `default`: use `Default::default()` instead of creating a specimen
///
/// # Enums
///
/// A variant is picked at random, then its fields are created:
///
/// ```rust
/// use autodata::Specimen;
///
/// #[derive(Debug, Specimen)]
/// enum Payment {
///     Cash,
///     Card(String),
///     Transfer { iban: String, reference: Option<String> },
/// }
/// ```
///
/// # Generic Types
///
/// Type parameters get a `Specimen` bound.
#[proc_macro_derive(Specimen, attributes(specimen))]
pub fn derive_specimen(input: TokenStream) -> TokenStream {
    derive::derive_specimen_impl(input)
}
