use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ScorePoint, TrendDirection};

/// Snapshots are compared against the one closest to this many days back.
pub(crate) const TREND_WINDOW_DAYS: i64 = 30;

/// Movements smaller than this band are reported as stable.
const STABLE_BAND: f64 = 5.0;

/// Band around the industry average treated as "near average".
const BENCHMARK_BAND: f64 = 5.0;

/// Month-over-month movement of a supplier's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrendReading {
    pub trend: TrendDirection,
    pub change: f64,
}

impl TrendReading {
    fn stable() -> Self {
        Self {
            trend: TrendDirection::Stable,
            change: 0.0,
        }
    }
}

/// Classify the movement from roughly a month ago to `current_score`.
///
/// The reference point is the most recent snapshot at or before the 30-day
/// cutoff. Fewer than two points, or no point old enough, reads as stable.
/// A decrease is reported as its absolute value; the direction carries the
/// sign.
pub(crate) fn month_over_month(
    points: &[ScorePoint],
    current_score: f64,
    now: DateTime<Utc>,
) -> TrendReading {
    if points.len() < 2 {
        return TrendReading::stable();
    }

    let cutoff = now - Duration::days(TREND_WINDOW_DAYS);
    let Some(reference) = points
        .iter()
        .filter(|point| point.date <= cutoff)
        .max_by_key(|point| point.date)
    else {
        return TrendReading::stable();
    };

    let change = current_score - reference.risk_score;
    if change.abs() < STABLE_BAND {
        TrendReading {
            trend: TrendDirection::Stable,
            change,
        }
    } else if change > 0.0 {
        TrendReading {
            trend: TrendDirection::Increasing,
            change,
        }
    } else {
        TrendReading {
            trend: TrendDirection::Decreasing,
            change: change.abs(),
        }
    }
}

/// Where a supplier sits relative to the rest of the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkPosition {
    BelowAverage,
    NearAverage,
    AboveAverage,
}

impl BenchmarkPosition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowAverage => "below industry average",
            Self::NearAverage => "near industry average",
            Self::AboveAverage => "above industry average",
        }
    }
}

/// Population comparison for one supplier's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub supplier_score: f64,
    pub industry_average: f64,
    pub percentile: f64,
    pub comparison: BenchmarkPosition,
}

/// Compare a score against the population of latest scores.
///
/// Percentile is the midrank position within the sorted population (ties
/// share their rank), expressed 0-100. An empty population benchmarks the
/// supplier against itself: own score as the average, percentile 50.
pub(crate) fn portfolio_benchmark(population: &[f64], supplier_score: f64) -> BenchmarkReport {
    if population.is_empty() {
        return BenchmarkReport {
            supplier_score,
            industry_average: supplier_score,
            percentile: 50.0,
            comparison: BenchmarkPosition::NearAverage,
        };
    }

    let count = population.len() as f64;
    let industry_average = population.iter().sum::<f64>() / count;

    let below = population
        .iter()
        .filter(|score| **score < supplier_score)
        .count() as f64;
    let equal = population
        .iter()
        .filter(|score| (**score - supplier_score).abs() < f64::EPSILON)
        .count() as f64;
    let percentile = 100.0 * (below + 0.5 * equal) / count;

    let comparison = if supplier_score < industry_average - BENCHMARK_BAND {
        BenchmarkPosition::BelowAverage
    } else if supplier_score > industry_average + BENCHMARK_BAND {
        BenchmarkPosition::AboveAverage
    } else {
        BenchmarkPosition::NearAverage
    };

    BenchmarkReport {
        supplier_score,
        industry_average,
        percentile,
        comparison,
    }
}
