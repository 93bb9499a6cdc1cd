//! Rolling-average anomaly scoring.
//!
//! The most recent snapshot is compared against the mean of every snapshot
//! before it, once for the daily total and once per spend category.

use crate::domain::model::{AnomalyFinding, CostDataset, FindingKind, ALL_CATEGORIES};
use std::collections::{BTreeMap, BTreeSet};

/// Categories whose baseline average is at or below this amount are not scored.
pub const NOISE_FLOOR: f64 = 10.0;

pub fn detect_anomalies(dataset: &CostDataset, threshold_percent: f64) -> Vec<AnomalyFinding> {
    let Some(current) = dataset.current() else {
        tracing::warn!("Not enough data points for anomaly detection (0 days)");
        return Vec::new();
    };
    let baseline = dataset.baseline();
    if baseline.is_empty() {
        tracing::warn!("Not enough data points for anomaly detection (1 day)");
        return Vec::new();
    }

    let days = baseline.len() as f64;
    let average_total = baseline.iter().map(|s| s.total).sum::<f64>() / days;

    let all_categories: BTreeSet<&str> = baseline
        .iter()
        .flat_map(|s| s.categories.keys().map(String::as_str))
        .collect();

    let category_averages: BTreeMap<&str, f64> = all_categories
        .into_iter()
        .map(|category| {
            let sum: f64 = baseline.iter().map(|s| s.category_cost(category)).sum();
            (category, sum / days)
        })
        .collect();

    tracing::debug!(
        "Baseline over {} days: average total {:.2}, {} categories",
        baseline.len(),
        average_total,
        category_averages.len()
    );

    let mut findings = Vec::new();

    if average_total > 0.0 {
        let deviation = deviation_percent(current.total, average_total);
        if deviation.abs() > threshold_percent {
            findings.push(AnomalyFinding {
                kind: FindingKind::Aggregate,
                category: ALL_CATEGORIES.to_string(),
                date: current.date,
                current_value: round_to(current.total, 2),
                baseline_average: round_to(average_total, 2),
                deviation_percent: round_to(deviation, 1),
            });
        }
    }

    for (category, &current_cost) in &current.categories {
        let average = category_averages
            .get(category.as_str())
            .copied()
            .unwrap_or(0.0);
        // 小額服務的波動不具參考價值
        if average <= NOISE_FLOOR {
            continue;
        }

        let deviation = deviation_percent(current_cost, average);
        if deviation.abs() > threshold_percent {
            findings.push(AnomalyFinding {
                kind: FindingKind::PerCategory,
                category: category.clone(),
                date: current.date,
                current_value: round_to(current_cost, 2),
                baseline_average: round_to(average, 2),
                deviation_percent: round_to(deviation, 1),
            });
        }
    }

    // stable: ties keep insertion order
    findings.sort_by(|a, b| {
        b.deviation_percent
            .abs()
            .total_cmp(&a.deviation_percent.abs())
    });
    findings
}

fn deviation_percent(current: f64, average: f64) -> f64 {
    (current - average) / average * 100.0
}

/// Rounds on the exact binary value with ties to even, so `40.25` becomes
/// `40.2` and `2.675` (stored just below) becomes `2.67`.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}
