//! Rows made entirely of generated specimens.

use std::fmt;
use std::sync::Arc;

use crate::builder::SpecimenBuilder;
use crate::error::DataError;
use crate::fixture::Fixture;
use crate::source::{DataRequest, DataSource};
use crate::value::Row;

/// A single row generated by a [`SpecimenBuilder`]
///
/// The builder is invoked once per covered parameter, in parameter order.
/// Failures are returned exactly as the builder reported them.
#[derive(Clone)]
pub struct AutoData {
    builder: Arc<dyn SpecimenBuilder>,
}

impl AutoData {
    /// Generate with a fresh default [`Fixture`]
    pub fn new() -> Self {
        Self::with_builder(Fixture::new())
    }

    /// Generate with the given builder
    pub fn with_builder(builder: impl SpecimenBuilder + 'static) -> Self {
        Self {
            builder: Arc::new(builder),
        }
    }

    /// Generate with a builder shared with other sources
    pub fn shared(builder: Arc<dyn SpecimenBuilder>) -> Self {
        Self { builder }
    }

    /// The builder used for every generated value
    pub fn builder(&self) -> &Arc<dyn SpecimenBuilder> {
        &self.builder
    }
}

impl Default for AutoData {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Fixture> for AutoData {
    fn from(fixture: Fixture) -> Self {
        Self::with_builder(fixture)
    }
}

impl fmt::Debug for AutoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoData")
            .field("builder", &Arc::as_ptr(&self.builder))
            .finish()
    }
}

impl DataSource for AutoData {
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
        let mut row = Vec::with_capacity(request.remaining());
        for parameter in request.parameters() {
            let value = match &parameter.name {
                Some(name) => self.builder.create_named(&parameter.ty, name)?,
                None => self.builder.create(&parameter.ty)?,
            };
            log::trace!("generated {:?} for parameter {}", value, parameter.position);
            row.push(value);
        }
        Ok(vec![row])
    }
}
