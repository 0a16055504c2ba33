//! Monthly series arithmetic and the evidence-precedence model.
//!
//! The platform never had one table of payments: course fees may be
//! recorded as admission confirmations, as paid installments, or only as
//! legacy user flags. Rather than nesting the fallbacks in conditionals,
//! the precedence is an explicit ordered list of evidence sources and the
//! first source with any data wins.

use std::collections::BTreeMap;

use serde::Serialize;

/// Where a revenue or purchase series was sourced from, in precedence
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeEvidence {
    Confirmations,
    PaidInstallments,
    UserFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAmount {
    pub year: i32,
    pub month: u32,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Sums per-month contributions into an ascending (year, month) series.
pub fn amount_series<I>(entries: I) -> Vec<MonthlyAmount>
where
    I: IntoIterator<Item = (MonthKey, u64)>,
{
    let mut totals: BTreeMap<MonthKey, u64> = BTreeMap::new();
    for (key, amount) in entries {
        *totals.entry(key).or_default() += amount;
    }
    totals
        .into_iter()
        .map(|(key, amount)| MonthlyAmount {
            year: key.year,
            month: key.month,
            amount,
        })
        .collect()
}

/// Counts per-month occurrences into an ascending (year, month) series.
pub fn count_series<I>(entries: I) -> Vec<MonthlyCount>
where
    I: IntoIterator<Item = MonthKey>,
{
    let mut totals: BTreeMap<MonthKey, u64> = BTreeMap::new();
    for key in entries {
        *totals.entry(key).or_default() += 1;
    }
    totals
        .into_iter()
        .map(|(key, count)| MonthlyCount {
            year: key.year,
            month: key.month,
            count,
        })
        .collect()
}

/// Merges two monthly series by (year, month); overlapping months sum.
pub fn merge_amounts(a: Vec<MonthlyAmount>, b: Vec<MonthlyAmount>) -> Vec<MonthlyAmount> {
    amount_series(
        a.into_iter()
            .chain(b)
            .map(|entry| (MonthKey { year: entry.year, month: entry.month }, entry.amount)),
    )
}

/// Picks the highest-priority source with any data. When every source is
/// empty the first (highest-priority) source is reported with an empty
/// series, so an empty database still names its preferred evidence.
pub fn first_with_data<T>(sources: Vec<(FeeEvidence, Vec<T>)>) -> (FeeEvidence, Vec<T>) {
    let first = sources
        .first()
        .map(|(source, _)| *source)
        .unwrap_or(FeeEvidence::Confirmations);
    sources
        .into_iter()
        .find(|(_, series)| !series.is_empty())
        .unwrap_or((first, Vec::new()))
}

/// Percent delta between two window counts, rounded to 2 decimals.
/// A window appearing from nothing reads as +100%; two empty windows read
/// as 0%.
pub fn pct(curr: u64, prev: u64) -> f64 {
    if prev == 0 {
        if curr > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        let raw = (curr as f64 - prev as f64) / prev as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}
