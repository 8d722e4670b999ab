//! The `Specimen` trait and its implementations for standard library types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use num_traits::{Bounded, NumCast};
use rand::Rng;

use crate::config::NumberGeneration;
use crate::error::DataError;
use crate::fixture::SpecimenContext;

/// Types a fixture can create without any registration
///
/// Nested values should be requested through the context (`ctx.create()`)
/// rather than through `T::create` directly, so that customizations on the
/// fixture and the recursion limit apply to them.
///
/// Usually derived:
///
/// ```rust
/// use autodata::{Fixture, Specimen};
///
/// #[derive(Debug, Specimen)]
/// struct Order {
///     id: u32,
///     customer: String,
///     lines: Vec<u16>,
/// }
///
/// let order: Order = Fixture::new().create().unwrap();
/// assert!(order.customer.starts_with("customer"));
/// assert_eq!(order.lines.len(), 3);
/// ```
pub trait Specimen: Sized + Send + Sync + 'static {
    /// Create an anonymous instance
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError>;

    /// Stand-in for a value requested past the recursion limit under
    /// [`RecursionPolicy::Omit`](crate::RecursionPolicy::Omit)
    fn omitted() -> Option<Self> {
        None
    }
}

/// Create a number according to the fixture's number generation mode
///
/// Values start at 1 and wrap around before exceeding the type's maximum.
pub fn number<T>(ctx: &mut SpecimenContext<'_>) -> Result<T, DataError>
where
    T: NumCast + Bounded,
{
    let max = <u64 as NumCast>::from(T::max_value()).unwrap_or(u64::MAX);
    let raw = match ctx.config().number_generation {
        NumberGeneration::Sequential => ctx.next_sequence(),
        NumberGeneration::Random => {
            let upper = max.min(255);
            ctx.with_rng(|rng| rng.gen_range(1..=upper))
        }
    };
    let wrapped = (raw - 1) % max + 1;
    <T as NumCast>::from(wrapped).ok_or_else(|| {
        DataError::generation_failed(
            format!("{} does not fit", wrapped),
            Some(std::any::type_name::<T>()),
        )
    })
}

macro_rules! impl_numeric_specimen {
    ($($t:ty),*) => {
        $(
            impl Specimen for $t {
                fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
                    number::<$t>(ctx)
                }
            }
        )*
    };
}

impl_numeric_specimen!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl Specimen for bool {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(match ctx.config().number_generation {
            // true, false, true, ...
            NumberGeneration::Sequential => ctx.next_sequence() % 2 == 1,
            NumberGeneration::Random => ctx.with_rng(|rng| rng.r#gen()),
        })
    }
}

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl Specimen for char {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        let index = match ctx.config().number_generation {
            NumberGeneration::Sequential => (ctx.next_sequence() - 1) as usize % ALPHANUMERIC.len(),
            NumberGeneration::Random => ctx.choose_index(ALPHANUMERIC.len()),
        };
        Ok(ALPHANUMERIC[index] as char)
    }
}

impl Specimen for String {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        let suffix: u128 = ctx.with_rng(|rng| rng.r#gen());
        Ok(match ctx.name() {
            Some(name) => format!("{}{:032x}", name, suffix),
            None => format!("{:032x}", suffix),
        })
    }
}

impl Specimen for () {
    fn create(_ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(())
    }
}

impl Specimen for Duration {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(Duration::from_secs(number::<u64>(ctx)?))
    }
}

impl<T: Specimen> Specimen for Option<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        if ctx.should_omit() {
            return Ok(None);
        }
        let item = ctx.create().map(Some);
        ctx.omit_on_limit(item, || None)
    }

    fn omitted() -> Option<Self> {
        Some(None)
    }
}

impl<T: Specimen> Specimen for Box<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        ctx.create().map(Box::new)
    }

    fn omitted() -> Option<Self> {
        T::omitted().map(Box::new)
    }
}

impl<T: Specimen> Specimen for Arc<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        ctx.create().map(Arc::new)
    }

    fn omitted() -> Option<Self> {
        T::omitted().map(Arc::new)
    }
}

impl<T: Specimen> Specimen for Vec<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        ctx.create_many()
    }

    fn omitted() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: Specimen> Specimen for VecDeque<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(ctx.create_many::<T>()?.into())
    }

    fn omitted() -> Option<Self> {
        Some(VecDeque::new())
    }
}

impl<T: Specimen + Eq + Hash> Specimen for HashSet<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(ctx.create_many::<T>()?.into_iter().collect())
    }

    fn omitted() -> Option<Self> {
        Some(HashSet::new())
    }
}

impl<T: Specimen + Ord> Specimen for BTreeSet<T> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(ctx.create_many::<T>()?.into_iter().collect())
    }

    fn omitted() -> Option<Self> {
        Some(BTreeSet::new())
    }
}

impl<K: Specimen + Eq + Hash, V: Specimen> Specimen for HashMap<K, V> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(ctx.create_many::<(K, V)>()?.into_iter().collect())
    }

    fn omitted() -> Option<Self> {
        Some(HashMap::new())
    }
}

impl<K: Specimen + Ord, V: Specimen> Specimen for BTreeMap<K, V> {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        Ok(ctx.create_many::<(K, V)>()?.into_iter().collect())
    }

    fn omitted() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

impl<T: Specimen, const N: usize> Specimen for [T; N] {
    fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(ctx.create::<T>()?);
        }
        <[T; N]>::try_from(items)
            .map_err(|items| DataError::internal(format!("expected {} items, got {}", N, items.len())))
    }
}

macro_rules! impl_tuple_specimen {
    ($($name:ident),+) => {
        impl<$($name: Specimen),+> Specimen for ($($name,)+) {
            fn create(ctx: &mut SpecimenContext<'_>) -> Result<Self, DataError> {
                Ok(($(ctx.create::<$name>()?,)+))
            }
        }
    };
}

impl_tuple_specimen!(A);
impl_tuple_specimen!(A, B);
impl_tuple_specimen!(A, B, C);
impl_tuple_specimen!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FixtureConfig, RecursionPolicy};
    use crate::fixture::Fixture;

    fn sequential() -> Fixture {
        Fixture::with_config(FixtureConfig {
            number_generation: NumberGeneration::Sequential,
            ..FixtureConfig::default()
        })
    }

    #[test]
    fn test_random_numbers_are_small_and_positive() {
        let fixture = Fixture::seeded(42);
        for _ in 0..200 {
            let value: i32 = fixture.create().unwrap();
            assert!((1..=255).contains(&value));

            let small: i8 = fixture.create().unwrap();
            assert!(small >= 1);

            let float: f64 = fixture.create().unwrap();
            assert!((1.0..=255.0).contains(&float));
        }
    }

    #[test]
    fn test_sequential_numbers_share_one_counter() {
        let fixture = sequential();
        assert_eq!(fixture.create::<i32>().unwrap(), 1);
        assert_eq!(fixture.create::<u8>().unwrap(), 2);
        assert_eq!(fixture.create::<i64>().unwrap(), 3);
        assert_eq!(fixture.create::<f32>().unwrap(), 4.0);
    }

    #[test]
    fn test_sequential_numbers_wrap_at_type_max() {
        let fixture = sequential();
        for _ in 0..127 {
            fixture.create::<i8>().unwrap();
        }
        assert_eq!(fixture.create::<i8>().unwrap(), 1);
    }

    #[test]
    fn test_sequential_booleans_alternate() {
        let fixture = sequential();
        let values: Vec<bool> = (0..4).map(|_| fixture.create().unwrap()).collect();
        assert_eq!(values, vec![true, false, true, false]);
    }

    #[test]
    fn test_strings_are_unique_hex() {
        let fixture = Fixture::new();
        let first: String = fixture.create().unwrap();
        let second: String = fixture.create().unwrap();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_chars_are_alphanumeric() {
        let fixture = Fixture::new();
        for _ in 0..50 {
            let c: char = fixture.create().unwrap();
            assert!(c.is_ascii_alphanumeric());
        }
    }

    #[test]
    fn test_collections_use_repeat_count() {
        let fixture = Fixture::with_config(FixtureConfig {
            repeat_count: 5,
            number_generation: NumberGeneration::Sequential,
            ..FixtureConfig::default()
        });

        let items: Vec<u32> = fixture.create().unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);

        let map: BTreeMap<u32, String> = fixture.create().unwrap();
        assert_eq!(map.len(), 5);

        let array: [u8; 2] = fixture.create().unwrap();
        assert_eq!(array, [11, 12]);
    }

    #[test]
    fn test_option_is_some_until_omitted() {
        let fixture = Fixture::new();
        let value: Option<u8> = fixture.create().unwrap();
        assert!(value.is_some());

        let fixture = Fixture::with_config(FixtureConfig {
            max_depth: 1,
            recursion_policy: RecursionPolicy::Omit,
            ..FixtureConfig::default()
        });
        let value: Option<u8> = fixture.create().unwrap();
        assert!(value.is_none());
        let items: Vec<u8> = fixture.create().unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_tuples_and_wrappers() {
        let fixture = sequential();
        let (a, b, c): (u8, Box<u8>, Arc<u8>) = fixture.create().unwrap();
        assert_eq!((a, *b, *c), (1, 2, 3));

        let duration: Duration = fixture.create().unwrap();
        assert_eq!(duration, Duration::from_secs(4));
    }
}
