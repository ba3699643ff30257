//! Sum long records into yearly totals.

use std::collections::BTreeMap;

use crate::domain::{LongRecord, YearPoint, YearlySeries};

/// Sum values per year across all categories.
///
/// Unset values contribute nothing (SQL `SUM` over NULLs). A year in which
/// every cell is unset still appears, with a total of 0. Output is ascending by
/// year; empty input gives an empty series.
pub fn aggregate(records: &[LongRecord]) -> YearlySeries {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.year).or_insert(0.0) += r.value.unwrap_or(0.0);
    }
    YearlySeries(
        totals
            .into_iter()
            .map(|(year, total)| YearPoint { year, total })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rec(category: &str, year: i32, value: Option<f64>) -> LongRecord {
        LongRecord {
            category: category.to_string(),
            year,
            value,
        }
    }

    #[test]
    fn sums_per_year_ignoring_unset() {
        let records = vec![
            rec("Forest", 2021, Some(1.5)),
            rec("Forest", 2020, Some(1.0)),
            rec("Pasture", 2020, None),
            rec("Pasture", 2021, Some(2.0)),
            rec("Urban", 2020, Some(4.0)),
        ];
        let series = aggregate(&records);
        assert_eq!(series.years(), vec![2020, 2021]);
        assert_relative_eq!(series.points()[0].total, 5.0);
        assert_relative_eq!(series.points()[1].total, 3.5);
    }

    #[test]
    fn all_unset_year_totals_zero() {
        let records = vec![rec("Forest", 2019, None), rec("Forest", 2020, Some(2.0))];
        let series = aggregate(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0], YearPoint { year: 2019, total: 0.0 });
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }
}
