//! Literal values completed with generated specimens.

use crate::error::DataError;
use crate::fixture::Fixture;
use crate::signature::Signature;
use crate::source::composite::compose;
use crate::source::{AutoData, DataRequest, DataSource, InlineData};
use crate::value::{Row, Value, format_row};

/// Provides a theory's arguments from inline values, generating the rest
///
/// The literal values fill the leading parameters in order; every remaining
/// parameter is generated by the wrapped [`AutoData`]. Supplying more values
/// than the theory has parameters is a configuration error.
///
/// Custom generation is injected rather than inherited: build the
/// [`AutoData`] around whatever [`SpecimenBuilder`](crate::SpecimenBuilder)
/// should be used and pass it to [`with_auto_data`](Self::with_auto_data).
///
/// ```rust
/// use autodata::{AutoData, Customization, DataSource, Fixture, InlineAutoData, Signature, values};
///
/// struct TheAnswer;
///
/// impl Customization for TheAnswer {
///     fn customize(&self, fixture: &mut Fixture) {
///         fixture.inject(42i32);
///     }
/// }
///
/// let auto_data = AutoData::from(Fixture::new().customize(TheAnswer));
/// let data = InlineAutoData::with_auto_data(auto_data, values![1337, 7]);
///
/// let signature = Signature::of::<(i32, i32, i32)>();
/// let rows = autodata::complete_rows(&data, &signature).unwrap();
/// let row: Vec<i32> = rows[0]
///     .iter()
///     .map(|value| *value.downcast_ref::<i32>().unwrap())
///     .collect();
/// assert_eq!(row, vec![1337, 7, 42]);
/// ```
#[derive(Debug, Clone)]
pub struct InlineAutoData {
    inline: InlineData,
    auto_data: AutoData,
}

impl InlineAutoData {
    /// Inline values completed by a default [`Fixture`]
    pub fn new(values: Vec<Value>) -> Self {
        Self::with_auto_data(AutoData::new(), values)
    }

    /// Inline values completed by the given [`AutoData`]
    pub fn with_auto_data(auto_data: AutoData, values: Vec<Value>) -> Self {
        Self {
            inline: InlineData::new(values),
            auto_data,
        }
    }

    /// Inline values completed by the given fixture
    pub fn with_fixture(fixture: Fixture, values: Vec<Value>) -> Self {
        Self::with_auto_data(AutoData::from(fixture), values)
    }

    /// The values passed to the theory, in order
    pub fn values(&self) -> &[Value] {
        self.inline.values()
    }

    /// The [`AutoData`] generating the remaining arguments
    pub fn auto_data(&self) -> &AutoData {
        &self.auto_data
    }
}

impl DataSource for InlineAutoData {
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
        compose(&[&self.inline, &self.auto_data], request)
    }

    fn validate(&self, signature: &Signature) -> Result<(), DataError> {
        self.inline.validate(signature)
    }

    fn describe(&self) -> String {
        format!("InlineAutoData{}", format_row(self.values()))
    }
}
