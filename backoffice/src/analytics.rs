//! Revenue analytics
//!
//! Pure aggregation over the mirrored `analysis` rows. Everything here
//! recomputes from the full record set, so the functions stay
//! deterministic under any feed interleaving.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use shared::models::RevenueRecord;

/// Bucket width for period grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Zero-padded bucket key, so string order equals chronological order
    fn key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Month => date.format("%Y-%m").to_string(),
            Granularity::Year => date.format("%Y").to_string(),
        }
    }
}

/// One period bucket: summed amount plus how many records landed in it
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPeriod {
    pub period: String,
    pub amount: f64,
    pub count: usize,
}

/// Headline numbers for the dashboard summary cards
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub daily_average: f64,
    pub transactions: usize,
    /// Percent change of the last 30 days over the 30 days before them
    pub growth_30d: f64,
}

/// Sum amounts into period buckets, ascending by period
pub fn group_by_period(records: &[RevenueRecord], granularity: Granularity) -> Vec<AggregatedPeriod> {
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let bucket = buckets.entry(granularity.key(record.date)).or_insert((0.0, 0));
        bucket.0 += record.amount;
        bucket.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(period, (amount, count))| AggregatedPeriod { period, amount, count })
        .collect()
}

/// Totals, per-day average and 30-day growth as of `today`
pub fn summary_metrics(records: &[RevenueRecord], today: NaiveDate) -> SummaryMetrics {
    if records.is_empty() {
        return SummaryMetrics::default();
    }

    let total_revenue: f64 = records.iter().map(|r| r.amount).sum();
    let days = group_by_period(records, Granularity::Day).len();
    let daily_average = total_revenue / days as f64;

    let recent_start = today - Days::new(30);
    let prior_start = today - Days::new(60);
    let recent: f64 = records
        .iter()
        .filter(|r| r.date >= recent_start)
        .map(|r| r.amount)
        .sum();
    let prior: f64 = records
        .iter()
        .filter(|r| r.date >= prior_start && r.date < recent_start)
        .map(|r| r.amount)
        .sum();
    // No baseline window means no growth figure, not a division by zero
    let growth_30d = if prior == 0.0 {
        0.0
    } else {
        (recent - prior) / prior * 100.0
    };

    SummaryMetrics {
        total_revenue,
        daily_average,
        transactions: records.len(),
        growth_30d,
    }
}

/// The `n` highest-revenue days, descending; equal days keep date order
pub fn top_days(records: &[RevenueRecord], n: usize) -> Vec<(NaiveDate, f64)> {
    let mut days: Vec<(NaiveDate, f64)> = records
        .iter()
        .fold(BTreeMap::<NaiveDate, f64>::new(), |mut acc, r| {
            *acc.entry(r.date).or_insert(0.0) += r.amount;
            acc
        })
        .into_iter()
        .collect();
    days.sort_by(|a, b| b.1.total_cmp(&a.1));
    days.truncate(n);
    days
}

/// Distinct years present in the records, most recent first
pub fn available_years(records: &[RevenueRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.date.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Records restricted to one calendar year
pub fn filter_year(records: &[RevenueRecord], year: i32) -> Vec<RevenueRecord> {
    records
        .iter()
        .filter(|r| r.date.year() == year)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, amount: f64) -> RevenueRecord {
        RevenueRecord::new(date.parse().unwrap(), amount)
    }

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    #[test]
    fn month_grouping_sums_and_sorts() {
        let records = vec![
            rec("2024-02-10", 200.0),
            rec("2024-01-05", 100.0),
            rec("2024-01-20", 50.0),
        ];
        assert_eq!(
            group_by_period(&records, Granularity::Month),
            vec![
                AggregatedPeriod {
                    period: "2024-01".to_string(),
                    amount: 150.0,
                    count: 2,
                },
                AggregatedPeriod {
                    period: "2024-02".to_string(),
                    amount: 200.0,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn grouping_is_input_order_invariant() {
        let mut records = vec![
            rec("2023-12-31", 10.0),
            rec("2024-01-05", 100.0),
            rec("2024-01-20", 50.0),
            rec("2024-02-10", 200.0),
        ];
        let expected = group_by_period(&records, Granularity::Day);
        records.reverse();
        assert_eq!(group_by_period(&records, Granularity::Day), expected);
        records.swap(0, 2);
        assert_eq!(group_by_period(&records, Granularity::Day), expected);
    }

    #[test]
    fn day_keys_are_zero_padded() {
        let records = vec![rec("2024-03-07", 1.0)];
        let grouped = group_by_period(&records, Granularity::Day);
        assert_eq!(grouped[0].period, "2024-03-07");
    }

    #[test]
    fn summary_of_empty_records_is_all_zero() {
        assert_eq!(
            summary_metrics(&[], day("2024-06-01")),
            SummaryMetrics::default()
        );
    }

    #[test]
    fn summary_totals_and_daily_average() {
        let records = vec![
            rec("2024-05-01", 100.0),
            rec("2024-05-01", 50.0),
            rec("2024-05-03", 150.0),
        ];
        let metrics = summary_metrics(&records, day("2024-06-01"));
        assert_eq!(metrics.total_revenue, 300.0);
        assert_eq!(metrics.daily_average, 150.0); // two distinct days
        assert_eq!(metrics.transactions, 3);
    }

    #[test]
    fn growth_compares_the_two_30_day_windows() {
        let today = day("2024-06-30");
        let records = vec![
            rec("2024-06-20", 300.0), // recent window
            rec("2024-05-15", 200.0), // prior window
        ];
        let metrics = summary_metrics(&records, today);
        assert_eq!(metrics.growth_30d, 50.0);
    }

    #[test]
    fn growth_is_zero_when_the_prior_window_is_empty() {
        let today = day("2024-06-30");
        let records = vec![rec("2024-06-20", 300.0)];
        assert_eq!(summary_metrics(&records, today).growth_30d, 0.0);
    }

    #[test]
    fn top_days_is_descending_and_stable() {
        let records = vec![
            rec("2024-01-01", 100.0),
            rec("2024-01-02", 300.0),
            rec("2024-01-03", 100.0),
            rec("2024-01-04", 200.0),
        ];
        let top = top_days(&records, 3);
        assert_eq!(
            top,
            vec![
                (day("2024-01-02"), 300.0),
                (day("2024-01-04"), 200.0),
                // ties keep chronological order
                (day("2024-01-01"), 100.0),
            ]
        );
    }

    #[test]
    fn top_days_sums_a_day_with_several_records() {
        let records = vec![
            rec("2024-01-01", 100.0),
            rec("2024-01-01", 150.0),
            rec("2024-01-02", 200.0),
        ];
        let top = top_days(&records, 1);
        assert_eq!(top, vec![(day("2024-01-01"), 250.0)]);
    }

    #[test]
    fn years_are_distinct_and_recent_first() {
        let records = vec![
            rec("2022-01-01", 1.0),
            rec("2024-01-01", 1.0),
            rec("2022-06-01", 1.0),
            rec("2023-01-01", 1.0),
        ];
        assert_eq!(available_years(&records), vec![2024, 2023, 2022]);
    }

    #[test]
    fn filter_year_keeps_only_that_year() {
        let records = vec![
            rec("2023-12-31", 1.0),
            rec("2024-01-01", 2.0),
            rec("2024-07-15", 3.0),
        ];
        let filtered = filter_year(&records, 2024);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.date.year() == 2024));
    }
}
