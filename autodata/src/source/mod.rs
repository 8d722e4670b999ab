//! Data sources feeding rows of arguments to theories.
//!
//! A source is asked for rows covering the parameters from
//! [`DataRequest::start`] onwards. Sources that complete rows begun by other
//! sources (see [`CompositeData`]) use `start` to skip positions that are
//! already filled.

pub mod auto;
pub mod composite;
pub mod inline;
pub mod inline_auto;

pub use auto::AutoData;
pub use composite::CompositeData;
pub use inline::InlineData;
pub use inline_auto::InlineAutoData;

use crate::error::DataError;
use crate::signature::{Parameter, Signature};
use crate::value::Row;

/// What a source is asked to fill
#[derive(Debug, Clone, Copy)]
pub struct DataRequest<'a> {
    signature: &'a Signature,
    start: usize,
}

impl<'a> DataRequest<'a> {
    /// Request covering the whole signature
    pub fn new(signature: &'a Signature) -> Self {
        Self {
            signature,
            start: 0,
        }
    }

    /// Request covering the parameters from `start` onwards
    pub fn starting_at(signature: &'a Signature, start: usize) -> Self {
        Self { signature, start }
    }

    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of parameters this request still covers
    pub fn remaining(&self) -> usize {
        self.signature.len().saturating_sub(self.start)
    }

    /// Parameters this request still covers
    pub fn parameters(&self) -> &'a [Parameter] {
        let start = self.start.min(self.signature.len());
        &self.signature.as_slice()[start..]
    }
}

/// Something that produces rows of theory arguments
pub trait DataSource: Send + Sync {
    /// Produce rows for the parameters covered by `request`
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError>;

    /// Check the source against a signature without producing data
    fn validate(&self, _signature: &Signature) -> Result<(), DataError> {
        Ok(())
    }

    /// Short description used in reports
    fn describe(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("DataSource")
            .to_string()
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
        (**self).rows(request)
    }

    fn validate(&self, signature: &Signature) -> Result<(), DataError> {
        (**self).validate(signature)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Produce the complete rows of `source` for `signature`
///
/// Every row is checked against the signature.
pub fn complete_rows(source: &dyn DataSource, signature: &Signature) -> Result<Vec<Row>, DataError> {
    source.validate(signature)?;
    let rows = source.rows(&DataRequest::new(signature))?;
    for row in &rows {
        signature.check_row(row)?;
    }
    log::debug!("{} produced {} row(s)", source.describe(), rows.len());
    Ok(rows)
}
