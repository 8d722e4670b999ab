//! Declarative macros for declaring theory data with less boilerplate.

/// Wrap each expression in a [`Value`](crate::Value)
///
/// ```rust
/// use autodata::values;
///
/// let row = values![1337, "seven".to_string(), 42u8];
/// assert_eq!(row.len(), 3);
/// assert!(row[2].is::<u8>());
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($value)),+]
    };
}

/// Build an [`InlineAutoData`](crate::InlineAutoData) from literal values
///
/// Uses a default fixture unless an `auto_data = ...;` or `fixture = ...;`
/// prefix is given.
///
/// ```rust
/// use autodata::{Fixture, inline_auto_data};
///
/// let plain = inline_auto_data![1337, 7];
/// assert_eq!(plain.values().len(), 2);
///
/// let mut fixture = Fixture::new();
/// fixture.inject(42i32);
/// let customized = inline_auto_data![fixture = fixture; 1337, 7];
/// assert_eq!(customized.values()[0].downcast_ref::<i32>(), Some(&1337));
/// ```
#[macro_export]
macro_rules! inline_auto_data {
    (auto_data = $auto_data:expr; $($value:expr),* $(,)?) => {
        $crate::InlineAutoData::with_auto_data($auto_data, $crate::values![$($value),*])
    };
    (fixture = $fixture:expr; $($value:expr),* $(,)?) => {
        $crate::InlineAutoData::with_fixture($fixture, $crate::values![$($value),*])
    };
    ($($value:expr),* $(,)?) => {
        $crate::InlineAutoData::new($crate::values![$($value),*])
    };
}

/// Run a theory over the given sources, panicking if any row fails
///
/// ```rust
/// use autodata::{assert_theory, inline_auto_data};
///
/// assert_theory!(
///     "addition_commutes",
///     |(a, b): (u8, u8)| assert_eq!(u16::from(a) + u16::from(b), u16::from(b) + u16::from(a)),
///     inline_auto_data![1u8],
///     inline_auto_data![],
/// );
/// ```
#[macro_export]
macro_rules! assert_theory {
    ($name:expr, $body:expr, $($case:expr),+ $(,)?) => {{
        let theory = $crate::Theory::new($name, $body)$(.case($case))+;
        match theory.run() {
            Ok(report) => report.assert_passes(),
            Err(error) => panic!("Theory {} could not produce data: {}", theory.name(), error),
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::{AutoData, DataSource, Fixture, Signature, Value, complete_rows};

    #[test]
    fn test_values_macro() {
        let empty: Vec<Value> = values![];
        assert!(empty.is_empty());

        let row = values![1, "a", 2.5f64,];
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].downcast_ref::<i32>(), Some(&1));
        assert_eq!(row[1].downcast_ref::<&str>(), Some(&"a"));
    }

    #[test]
    fn test_inline_auto_data_macro_forms() {
        let plain = inline_auto_data![1337, 7, 42];
        assert_eq!(format!("{:?}", plain.values()), "[1337, 7, 42]");

        let mut fixture = Fixture::new();
        fixture.inject(42i32);
        let data = inline_auto_data![fixture = fixture; 1337, 7];
        let rows = complete_rows(&data, &Signature::of::<(i32, i32, i32)>()).unwrap();
        assert_eq!(rows[0][2].downcast_ref::<i32>(), Some(&42));

        let auto_data = AutoData::new();
        let shared = auto_data.builder().clone();
        let data = inline_auto_data![auto_data = auto_data;];
        assert!(data.values().is_empty());
        assert!(std::sync::Arc::ptr_eq(data.auto_data().builder(), &shared));
        assert_eq!(data.describe(), "InlineAutoData()");
    }

    #[test]
    fn test_assert_theory_passing() {
        assert_theory!(
            "strings_are_not_empty",
            |(s,): (String,)| assert!(!s.is_empty()),
            inline_auto_data![],
            inline_auto_data!["given".to_string()],
        );
    }

    #[test]
    #[should_panic(expected = "could not produce data")]
    fn test_assert_theory_data_error() {
        assert_theory!("too_many", |(_n,): (i32,)| {}, inline_auto_data![1, 2]);
    }

    #[test]
    #[should_panic(expected = "Theory is_even failed")]
    fn test_assert_theory_failing() {
        assert_theory!("is_even", |(n,): (i32,)| assert_eq!(n % 2, 0), inline_auto_data![3]);
    }
}
