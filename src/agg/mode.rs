use super::stream::{empty, Aggregation};
use crate::Value;

/// Most frequent value
///
/// On tied counts the smallest value wins.
pub struct Mode;

impl Aggregation for Mode {
    const NAME: &'static str = "MODE";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        let mut sorted = values.to_vec();
        sorted.sort_by(Value::total_cmp);

        let mut best: Option<(Value, usize)> = None;

        // NOTE: Runs appear in ascending order, so only a strictly
        // larger count may replace the current winner
        for run in sorted.chunk_by(|a, b| a.total_cmp(b).is_eq()) {
            let Some(&value) = run.first() else {
                continue;
            };

            match best {
                Some((_, count)) if count >= run.len() => {}
                _ => best = Some((value, run.len())),
            }
        }

        best.map(|(value, _)| value).ok_or_else(empty::<Self>)
    }
}
