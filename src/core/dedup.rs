//! Collapsing gym records that describe the same place.
//!
//! Two records are the same place when their names match ignoring case and
//! whitespace, and their coordinates agree to three decimal places (~100m).
//! The first record seen wins; later duplicates are dropped.

use std::collections::HashSet;

use crate::models::{Coordinates, Gym};

/// Anything carrying a display name and a position
pub trait GeoKeyed {
    fn name(&self) -> &str;
    fn coordinates(&self) -> Coordinates;
}

impl GeoKeyed for Gym {
    fn name(&self) -> &str {
        &self.name
    }

    fn coordinates(&self) -> Coordinates {
        self.location
    }
}

/// Rounds half up, so -0.1875 becomes -187 rather than -188.
#[inline]
fn millidegrees(value: f64) -> i64 {
    (value * 1000.0 + 0.5).floor() as i64
}

/// Identity key: compacted lowercase name plus coordinates at 3 decimals
pub fn dedup_key(name: &str, coordinates: &Coordinates) -> String {
    let compact: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    format!(
        "{}_{}_{}",
        compact,
        millidegrees(coordinates.latitude),
        millidegrees(coordinates.longitude)
    )
}

/// Keep the first record for every key, preserving input order
pub fn remove_duplicates<T: GeoKeyed>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record.name(), &record.coordinates())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pin(&'static str, f64, f64);

    impl GeoKeyed for Pin {
        fn name(&self) -> &str {
            self.0
        }

        fn coordinates(&self) -> Coordinates {
            Coordinates::new(self.1, self.2)
        }
    }

    #[test]
    fn test_key_ignores_case_and_whitespace() {
        let a = dedup_key("PureGym London Bank", &Coordinates::new(51.5127, -0.0907));
        let b = dedup_key("puregym  londonbank", &Coordinates::new(51.51268, -0.09071));
        assert_eq!(a, b);
        assert_eq!(a, "puregymlondonbank_51513_-91");
    }

    #[test]
    fn test_half_rounds_up() {
        let key = dedup_key("x", &Coordinates::new(0.0625, -0.1875));
        assert_eq!(key, "x_63_-187");
    }

    #[test]
    fn test_same_place_collapses_first_wins() {
        let records = vec![
            Pin("PureGym Leeds", 53.79970, -1.54920),
            Pin("PureGym Leeds", 53.79974, -1.54918),
        ];
        let unique = remove_duplicates(records);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].1, 53.79970);
    }

    #[test]
    fn test_distinct_rounded_coordinates_kept() {
        let records = vec![
            Pin("PureGym Leeds", 53.7997, -1.5492),
            Pin("PureGym Leeds", 53.8107, -1.5492),
            Pin("PureGym Leeds Kirkstall", 53.7997, -1.5492),
        ];
        assert_eq!(remove_duplicates(records).len(), 3);
    }
}
