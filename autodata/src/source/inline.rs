//! Literal values written into the theory declaration.

use crate::error::DataError;
use crate::signature::Signature;
use crate::source::{DataRequest, DataSource};
use crate::value::{Row, Value, format_row};

/// A single row of literal values
///
/// The values map onto the leading parameters covered by the request. Fewer
/// values than parameters leaves a partial row for a following source to
/// complete; more values than parameters is an error.
#[derive(Debug, Clone, Default)]
pub struct InlineData {
    values: Vec<Value>,
}

impl InlineData {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl DataSource for InlineData {
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
        request
            .signature()
            .check_values(request.start(), &self.values)?;
        Ok(vec![self.values.clone()])
    }

    fn validate(&self, signature: &Signature) -> Result<(), DataError> {
        signature.check_values(0, &self.values)
    }

    fn describe(&self) -> String {
        format!("InlineData{}", format_row(&self.values))
    }
}
