//! Train/test split by year.

use crate::domain::{ModelOrder, Split, SplitConfig, YearPoint, YearlySeries};
use crate::error::PipelineError;

/// Partition a yearly series into train (`year <= train_end`) and test (the
/// configured test years).
///
/// This is a filter: years outside both ranges are dropped without comment.
/// Fails with `InsufficientData` when the training part is shorter than the
/// order needs (`p + d + 1` observations).
pub fn split(series: &YearlySeries, config: &SplitConfig, order: &ModelOrder) -> Result<Split, PipelineError> {
    let train: Vec<YearPoint> = series
        .points()
        .iter()
        .filter(|p| p.year <= config.train_end())
        .copied()
        .collect();
    let test: Vec<YearPoint> = series
        .points()
        .iter()
        .filter(|p| config.test_years().contains(&p.year))
        .copied()
        .collect();

    let needed = order.min_observations();
    if train.len() < needed {
        return Err(PipelineError::InsufficientData {
            needed,
            got: train.len(),
        });
    }

    Ok(Split {
        train: YearlySeries(train),
        test: YearlySeries(test),
    })
}
