//! Frequency tables over classification fields.

use crate::models::{FrequencyRow, FrequencyTable};
use std::collections::HashMap;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count values keeping first-seen order.
fn count_in_order<'a, I>(values: I) -> Vec<(&'a str, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, u64)> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// Rank values by descending count (ties keep first-seen order) and attach
/// relative and cumulative percentages rounded to two decimals.
pub fn frequency_table<'a, I>(values: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = count_in_order(values);
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let population: u64 = counts.iter().map(|(_, c)| *c).sum();
    let mut running = 0.0;
    let rows = counts
        .into_iter()
        .map(|(value, count)| {
            let relative = round2(count as f64 / population as f64 * 100.0);
            running += relative;
            FrequencyRow {
                variable: value.to_string(),
                absolute_freq: count,
                relative_freq: relative,
                cumulative_relative_freq: round2(running),
            }
        })
        .collect();
    FrequencyTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_with_first_seen_tie_break() {
        let table = frequency_table(["b", "a", "c", "a", "b", "d"]);
        let order: Vec<&str> = table.rows.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c", "d"]);
        assert_eq!(table.rows[0].absolute_freq, 2);
        assert_eq!(table.top().map(|r| r.variable.as_str()), Some("b"));
    }

    #[test]
    fn relative_and_cumulative_are_rounded() {
        let table = frequency_table(["x", "y", "z"]);
        assert!(table.rows.iter().all(|r| r.relative_freq == 33.33));
        assert_eq!(table.rows[0].cumulative_relative_freq, 33.33);
        assert_eq!(table.rows[1].cumulative_relative_freq, 66.66);
        assert_eq!(table.rows[2].cumulative_relative_freq, 99.99);
    }

    #[test]
    fn cumulative_reaches_hundred_for_full_population() {
        let values: Vec<String> = (0..40).map(|i| format!("v{}", i % 7)).collect();
        let table = frequency_table(values.iter().map(String::as_str));
        let last = table.rows.last().unwrap();
        assert!((last.cumulative_relative_freq - 100.0).abs() <= 0.05);
        let absolute: u64 = table.rows.iter().map(|r| r.absolute_freq).sum();
        assert_eq!(absolute, 40);
        assert!(table
            .rows
            .windows(2)
            .all(|w| w[0].absolute_freq >= w[1].absolute_freq));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = frequency_table(std::iter::empty());
        assert!(table.is_empty());
        assert!(table.top().is_none());
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(50.0), 50.0);
    }
}
