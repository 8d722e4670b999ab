#![allow(clippy::result_large_err)]

//! # Autodata - Theories over Literal and Generated Data
//!
//! Autodata runs parameterized tests ("theories") over rows of arguments
//! that mix hard-coded literal values with automatically generated
//! specimens. [`InlineAutoData`] supplies its literal values for the leading
//! parameters and asks a [`SpecimenBuilder`] (by default a [`Fixture`]) for
//! everything else.
//!
//! ## Quick Start
//!
//! ```rust
//! use autodata::{Customization, Fixture, InlineAutoData, Theory, values};
//!
//! struct TheAnswer;
//!
//! impl Customization for TheAnswer {
//!     fn customize(&self, fixture: &mut Fixture) {
//!         fixture.inject(42i32);
//!     }
//! }
//!
//! let fixture = Fixture::new().customize(TheAnswer);
//!
//! Theory::new("inline_values_come_first", |(x, y, z): (i32, i32, i32)| {
//!     assert_eq!((x, y, z), (1337, 7, 42));
//! })
//! .case(InlineAutoData::with_fixture(fixture, values![1337, 7]))
//! .run()
//! .unwrap()
//! .assert_passes();
//! ```

extern crate self as autodata;

pub mod builder;
pub mod config;
pub mod customization;
pub mod error;
pub mod fixture;
pub mod macros;
pub mod runner;
pub mod signature;
pub mod source;
pub mod specimen;
pub mod theory;
pub mod value;

pub use builder::{ErasedFactory, SpecimenBuilder, SpecimenRegistry};
pub use config::{
    FixtureConfig, GlobalConfig, NumberGeneration, RecursionPolicy, RunnerConfig,
    get_global_config, reset_global_config, set_global_config,
};
pub use customization::{
    CompositeCustomization, Customization, Inject, OmitOnRecursion, Seeded, SequentialNumbers,
};
pub use error::{ConfigError, DataError};
pub use fixture::{Fixture, SpecimenContext};
pub use runner::{
    DefaultFormatter, RunSummary, RunnableTheory, TestOutputFormatter, TheoryResult, TheoryRunner,
    VerboseFormatter,
};
pub use signature::{Parameter, ParameterType, Parameters, Signature, SignatureBuilder};
pub use source::{
    AutoData, CompositeData, DataRequest, DataSource, InlineAutoData, InlineData, complete_rows,
};
pub use specimen::Specimen;
pub use theory::{CaseOutcome, Theory, TheoryReport};
pub use value::{Datum, Row, Value, format_row};

// Re-export derive macro from separate crate when derive feature is enabled
#[cfg(feature = "derive")]
pub use autodata_derive::Specimen;
