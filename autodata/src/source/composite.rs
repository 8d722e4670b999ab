//! Sources layered on top of each other.

use std::collections::HashMap;

use crate::error::DataError;
use crate::signature::Signature;
use crate::source::{DataRequest, DataSource};
use crate::value::Row;

/// An ordered list of sources whose rows are combined position by position
///
/// Row `i` of the first source is extended with row `i` of the second
/// source, requested from the first uncovered parameter, and so on. The
/// combination stops at the shortest source. Earlier sources always win the
/// parameters they cover.
#[derive(Default)]
pub struct CompositeData {
    sources: Vec<Box<dyn DataSource>>,
}

impl CompositeData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source after the existing ones
    pub fn with(mut self, source: impl DataSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push(&mut self, source: Box<dyn DataSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for CompositeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl DataSource for CompositeData {
    fn rows(&self, request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
        let sources: Vec<&dyn DataSource> = self.sources.iter().map(|source| &**source).collect();
        compose(&sources, request)
    }

    fn validate(&self, signature: &Signature) -> Result<(), DataError> {
        // Only the leading source knows where it starts
        match self.sources.first() {
            Some(first) => first.validate(signature),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.sources.iter().map(|source| source.describe()).collect();
        format!("CompositeData[{}]", parts.join(", "))
    }
}

/// Combine the rows of `sources` for `request`
///
/// A following source is asked once per distinct partial row length, so a
/// source is never asked to fill parameters an earlier source covered.
pub(crate) fn compose(
    sources: &[&dyn DataSource],
    request: &DataRequest<'_>,
) -> Result<Vec<Row>, DataError> {
    let Some((first, rest)) = sources.split_first() else {
        return Ok(Vec::new());
    };

    let mut rows = first.rows(request)?;
    for source in rest {
        let mut tails: HashMap<usize, Vec<Row>> = HashMap::new();
        let mut combined = Vec::with_capacity(rows.len());

        for (index, mut row) in rows.into_iter().enumerate() {
            let start = request.start() + row.len();
            if !tails.contains_key(&start) {
                let produced =
                    source.rows(&DataRequest::starting_at(request.signature(), start))?;
                tails.insert(start, produced);
            }
            let Some(tail) = tails.get(&start).and_then(|rows| rows.get(index)) else {
                break;
            };
            row.extend(tail.iter().cloned());
            combined.push(row);
        }

        rows = combined;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::source::{AutoData, InlineData, complete_rows};
    use crate::value::Value;

    /// A fixed list of rows
    struct Rows(Vec<Row>);

    impl DataSource for Rows {
        fn rows(&self, _request: &DataRequest<'_>) -> Result<Vec<Row>, DataError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_first_source_wins_its_positions() {
        let mut fixture = Fixture::new();
        fixture.inject(0i32);

        let composite = CompositeData::new()
            .with(InlineData::new(vec![Value::new(5)]))
            .with(AutoData::from(fixture));
        let signature = Signature::of::<(i32, i32, i32)>();

        let rows = complete_rows(&composite, &signature).unwrap();
        assert_eq!(rows.len(), 1);
        let values: Vec<i32> = rows[0]
            .iter()
            .map(|value| *value.downcast_ref::<i32>().unwrap())
            .collect();
        assert_eq!(values, vec![5, 0, 0]);
    }

    #[test]
    fn test_zip_stops_at_shortest_source() {
        let composite = CompositeData::new()
            .with(Rows(vec![
                vec![Value::new(1)],
                vec![Value::new(2)],
                vec![Value::new(3)],
            ]))
            .with(AutoData::new());
        let signature = Signature::of::<(i32, String)>();

        let rows = complete_rows(&composite, &signature).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].downcast_ref::<i32>(), Some(&1));
        assert!(rows[0][1].is::<String>());
    }

    #[test]
    fn test_rows_are_zipped_by_index() {
        let composite = CompositeData::new()
            .with(Rows(vec![vec![Value::new(1)], vec![Value::new(2)]]))
            .with(Rows(vec![vec![Value::new('a')], vec![Value::new('b')]]));
        let signature = Signature::of::<(i32, char)>();

        let rows = complete_rows(&composite, &signature).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].downcast_ref::<i32>(), Some(&2));
        assert_eq!(rows[1][1].downcast_ref::<char>(), Some(&'b'));
    }

    #[test]
    fn test_incomplete_rows_are_rejected() {
        let composite = CompositeData::new().with(InlineData::new(vec![Value::new(1)]));
        let signature = Signature::of::<(i32, i32)>();

        let err = complete_rows(&composite, &signature).unwrap_err();
        assert_eq!(err, DataError::parameter_count(2, 1));
    }

    #[test]
    fn test_empty_composite_has_no_rows() {
        let composite = CompositeData::new();
        assert!(composite.is_empty());
        let signature = Signature::of::<(i32,)>();
        assert!(complete_rows(&composite, &signature).unwrap().is_empty());
    }

    #[test]
    fn test_describe() {
        let composite = CompositeData::new()
            .with(InlineData::new(vec![Value::new(1)]))
            .with(AutoData::new());
        assert_eq!(composite.describe(), "CompositeData[InlineData(1), AutoData]");
    }
}
