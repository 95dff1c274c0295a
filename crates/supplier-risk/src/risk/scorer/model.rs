use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::rules::RuleBasedScorer;
use super::{FeatureContribution, RiskScorer, ScoreBreakdown, ScorerError};
use crate::risk::domain::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

const BOOTSTRAP_SEED: u64 = 42;
const BOOTSTRAP_SAMPLES: usize = 512;
const BOOST_ROUNDS: usize = 96;
const LEARNING_RATE: f64 = 0.3;
const THRESHOLD_CANDIDATES: usize = 16;

/// Gradient-boosted regression over the canonical features: an additive
/// ensemble of depth-1 trees fit by least squares.
///
/// Each stump remembers its expected output over the training set, so a
/// prediction decomposes exactly into the base value plus one signed
/// contribution per split feature. Driver ranking consumes that
/// decomposition directly.
pub struct BoostedScorer {
    model: BoostedModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoostedModel {
    base: f64,
    stumps: Vec<Stump>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stump {
    feature: usize,
    threshold: f64,
    below: f64,
    above: f64,
    expected: f64,
}

impl BoostedScorer {
    /// Load a trained artifact, or fit the deterministic bootstrap model when
    /// the artifact is missing or unreadable. The degraded mode is logged,
    /// never surfaced as an error.
    pub fn load_or_bootstrap(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::from_artifact(path) {
                Ok(scorer) => {
                    info!(path = %path.display(), "loaded risk model artifact");
                    scorer
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "risk model artifact unavailable, fitting bootstrap model");
                    Self::bootstrap()
                }
            },
            None => Self::bootstrap(),
        }
    }

    pub fn from_artifact(path: &Path) -> Result<Self, ScorerError> {
        let raw = fs::read_to_string(path).map_err(|err| ScorerError::Artifact(err.to_string()))?;
        let model: BoostedModel =
            serde_json::from_str(&raw).map_err(|err| ScorerError::Artifact(err.to_string()))?;

        let well_formed = model.base.is_finite()
            && model.stumps.iter().all(|stump| {
                stump.feature < FEATURE_COUNT
                    && stump.threshold.is_finite()
                    && stump.below.is_finite()
                    && stump.above.is_finite()
                    && stump.expected.is_finite()
            });
        if !well_formed {
            return Err(ScorerError::Artifact(
                "artifact contains malformed stumps".to_string(),
            ));
        }

        Ok(Self { model })
    }

    /// Fit on a fixed-seed synthetic portfolio labelled by the rule surface.
    /// Cold starts are therefore deterministic and roughly agree with the
    /// fallback scorer until a real artifact is supplied.
    pub fn bootstrap() -> Self {
        let samples = synthetic_samples();
        Self {
            model: fit(&samples),
        }
    }
}

impl RiskScorer for BoostedScorer {
    fn name(&self) -> &'static str {
        "gradient-boosted"
    }

    fn score(&self, features: &FeatureVector) -> Result<ScoreBreakdown, ScorerError> {
        let values = features.values();
        let mut raw = self.model.base;
        let mut per_feature = [0.0f64; FEATURE_COUNT];

        for stump in &self.model.stumps {
            let leaf = if values[stump.feature] < stump.threshold {
                stump.below
            } else {
                stump.above
            };
            raw += leaf;
            per_feature[stump.feature] += leaf - stump.expected;
        }

        if !raw.is_finite() {
            return Err(ScorerError::NonFinite);
        }

        let contributions = FEATURE_NAMES
            .iter()
            .zip(values.iter().zip(per_feature.iter()))
            .map(|(name, (value, contribution))| FeatureContribution {
                feature: *name,
                value: *value,
                contribution: *contribution,
                axis_weight: None,
                label: None,
            })
            .collect();

        Ok(ScoreBreakdown {
            score: raw.clamp(0.0, 100.0),
            contributions,
        })
    }
}

fn synthetic_samples() -> Vec<([f64; FEATURE_COUNT], f64)> {
    let mut rng = StdRng::seed_from_u64(BOOTSTRAP_SEED);
    let scorer = RuleBasedScorer;
    let mut samples = Vec::with_capacity(BOOTSTRAP_SAMPLES);

    for _ in 0..BOOTSTRAP_SAMPLES {
        let total = rng.gen_range(0..=12u32);
        let expired = if total > 0 { rng.gen_range(0..=total) } else { 0 };
        let expiring_soon = if total > expired {
            rng.gen_range(0..=(total - expired))
        } else {
            0
        };
        let valid = total - expired - expiring_soon;

        let features = FeatureVector {
            days_to_nearest_expiry: if total > expired {
                rng.gen_range(0.0..365.0)
            } else {
                0.0
            },
            total_certificates: f64::from(total),
            expired_count: f64::from(expired),
            expiring_soon_count: f64::from(expiring_soon),
            valid_count: f64::from(valid),
            audit_pass_rate: rng.gen_range(0.4..=1.0),
            avg_certificate_validity_days: if total > 0 {
                rng.gen_range(90.0..1095.0)
            } else {
                0.0
            },
            financial_health_score: rng.gen_range(20.0..100.0),
            geographic_risk_score: rng.gen_range(0.0..100.0),
            years_in_business: rng.gen_range(0.0..30.0),
        };

        let label = scorer.evaluate(&features).score;
        samples.push((features.values(), label));
    }

    samples
}

fn fit(samples: &[([f64; FEATURE_COUNT], f64)]) -> BoostedModel {
    let count = samples.len() as f64;
    let base = samples.iter().map(|(_, label)| label).sum::<f64>() / count;

    let mut residuals: Vec<f64> = samples.iter().map(|(_, label)| label - base).collect();
    let thresholds = threshold_grid(samples);
    let mut stumps = Vec::with_capacity(BOOST_ROUNDS);

    for _ in 0..BOOST_ROUNDS {
        let Some(split) = best_split(samples, &residuals, &thresholds) else {
            break;
        };

        let below = LEARNING_RATE * split.below_mean;
        let above = LEARNING_RATE * split.above_mean;
        let expected = (split.below_count as f64 * below + split.above_count as f64 * above) / count;

        for ((values, _), residual) in samples.iter().zip(residuals.iter_mut()) {
            let leaf = if values[split.feature] < split.threshold {
                below
            } else {
                above
            };
            *residual -= leaf;
        }

        stumps.push(Stump {
            feature: split.feature,
            threshold: split.threshold,
            below,
            above,
            expected,
        });
    }

    BoostedModel { base, stumps }
}

struct Split {
    feature: usize,
    threshold: f64,
    below_mean: f64,
    above_mean: f64,
    below_count: usize,
    above_count: usize,
}

/// Candidate thresholds per feature: evenly spaced quantiles of the observed
/// values, deduplicated.
fn threshold_grid(samples: &[([f64; FEATURE_COUNT], f64)]) -> Vec<Vec<f64>> {
    (0..FEATURE_COUNT)
        .map(|feature| {
            let mut values: Vec<f64> = samples.iter().map(|(values, _)| values[feature]).collect();
            values.sort_by(f64::total_cmp);

            let step = (values.len() / THRESHOLD_CANDIDATES).max(1);
            let mut grid: Vec<f64> = values.iter().copied().step_by(step).collect();
            grid.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);
            grid
        })
        .collect()
}

/// Least-squares stump search: maximize the variance explained by splitting
/// the residuals at a candidate threshold.
fn best_split(
    samples: &[([f64; FEATURE_COUNT], f64)],
    residuals: &[f64],
    thresholds: &[Vec<f64>],
) -> Option<Split> {
    let mut best: Option<(f64, Split)> = None;

    for (feature, grid) in thresholds.iter().enumerate() {
        for &threshold in grid {
            let mut below_sum = 0.0;
            let mut below_count = 0usize;
            let mut above_sum = 0.0;
            let mut above_count = 0usize;

            for ((values, _), residual) in samples.iter().zip(residuals.iter()) {
                if values[feature] < threshold {
                    below_sum += residual;
                    below_count += 1;
                } else {
                    above_sum += residual;
                    above_count += 1;
                }
            }

            if below_count == 0 || above_count == 0 {
                continue;
            }

            let gain = below_sum * below_sum / below_count as f64
                + above_sum * above_sum / above_count as f64;

            if best.as_ref().map_or(true, |(current, _)| gain > *current) {
                best = Some((
                    gain,
                    Split {
                        feature,
                        threshold,
                        below_mean: below_sum / below_count as f64,
                        above_mean: above_sum / above_count as f64,
                        below_count,
                        above_count,
                    },
                ));
            }
        }
    }

    best.map(|(_, split)| split)
}
