use crate::grading::types::CategoryAverage;
use crate::grading::utility::sum_defined;

/// Rounds half up: `floor(value + 0.5)`.
///
/// Exactly `.5` always moves to the next integer, unlike `f64::round`
/// (which rounds away from zero) or banker's rounding. Grades are
/// non-negative in practice; for negative inputs this is still plain
/// floor semantics, so `-0.5` becomes `0`.
///
/// | Input   | Output |
/// |---------|--------|
/// | 2.5     | 3      |
/// | 2.4999  | 2      |
/// | -0.5    | 0      |
pub fn custom_round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Final grade of one row from its weighted category contributions.
///
/// Undefined contributions count as zero as long as at least one
/// category is defined; with none defined the grade is absent.
pub fn final_grade<I>(contributions: I) -> Option<i64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    sum_defined(contributions).map(custom_round)
}

/// Final grades for all rows. Only categories with a configured weight
/// take part.
pub fn combine_final_grades(averages: &[CategoryAverage], row_count: usize) -> Vec<Option<i64>> {
    (0..row_count)
        .map(|row| {
            final_grade(
                averages
                    .iter()
                    .filter(|a| a.weighted)
                    .map(|a| a.contributions.get(row).copied().flatten()),
            )
        })
        .collect()
}
