//! Isolation forest outlier scoring
//!
//! An ensemble of random partitioning trees: points that need fewer random
//! splits to be isolated are more likely to be outliers. Scores follow the
//! usual convention of `-2^(-E[h(x)] / c(n))`, so higher means more normal.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

use super::stats::percentile;

/// Euler–Mascheroni constant, used by the average path length
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Configuration for an isolation forest run
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Upper bound on the subsample drawn for each tree
    pub max_samples: usize,
    /// Fraction of points to flag, in (0, 1]
    pub contamination: f64,
    /// RNG seed, fixed for reproducible flags
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

/// Per-point scores and outlier flags
#[derive(Debug, Clone)]
pub struct OutlierScores {
    /// Higher = more normal
    pub scores: Vec<f64>,
    /// Scored strictly below the contamination percentile
    pub outliers: Vec<bool>,
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted forest
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Grow the forest over `data` (one row per point)
    pub fn fit(data: &[Vec<f64>], config: &ForestConfig) -> Result<Self> {
        validate(data)?;
        if config.n_trees == 0 || config.max_samples < 2 {
            return Err(Error::InvalidParameter(
                "isolation forest needs at least one tree and two samples".into(),
            ));
        }

        let sample_size = config.max_samples.min(data.len());
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_trees)
            .map(|_| {
                let mut indices = index::sample(&mut rng, data.len(), sample_size).into_vec();
                grow(data, &mut indices, 0, max_depth, &mut rng)
            })
            .collect();

        Ok(Self { trees, sample_size })
    }

    /// Anomaly score of one point (higher = more normal)
    pub fn score(&self, point: &[f64]) -> f64 {
        let mean_depth = self
            .trees
            .iter()
            .map(|tree| path_length(tree, point, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        -(2f64).powf(-mean_depth / average_path_length(self.sample_size))
    }
}

/// Fit a forest and flag the `contamination` fraction of lowest scores
pub fn fit_predict(data: &[Vec<f64>], config: &ForestConfig) -> Result<OutlierScores> {
    if !config.contamination.is_finite()
        || config.contamination <= 0.0
        || config.contamination > 1.0
    {
        return Err(Error::InvalidParameter(format!(
            "contamination must be in (0, 1], got {}",
            config.contamination
        )));
    }

    let forest = IsolationForest::fit(data, config)?;
    let scores: Vec<f64> = data.iter().map(|row| forest.score(row)).collect();
    let threshold = percentile(&scores, config.contamination * 100.0)
        .ok_or_else(|| Error::InvalidData("no points to score".into()))?;
    let outliers = scores.iter().map(|&s| s < threshold).collect();

    Ok(OutlierScores { scores, outliers })
}

fn validate(data: &[Vec<f64>]) -> Result<()> {
    let Some(first) = data.first() else {
        return Err(Error::InvalidData("no points to score".into()));
    };
    if data.len() < 2 {
        return Err(Error::InvalidData(
            "isolation forest needs at least two points".into(),
        ));
    }
    let dims = first.len();
    if dims == 0 {
        return Err(Error::InvalidData("points have no features".into()));
    }
    for (i, row) in data.iter().enumerate() {
        if row.len() != dims {
            return Err(Error::InvalidData(format!(
                "point {} has {} features, expected {}",
                i,
                row.len(),
                dims
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!("point {} has a non-finite feature", i)));
        }
    }
    Ok(())
}

fn grow(
    data: &[Vec<f64>],
    indices: &mut [usize],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= max_depth || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features that still vary inside this node can split it
    let dims = data[indices[0]].len();
    let candidates: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|feature| {
            let (min, max) = indices.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &i| (lo.min(data[i][feature]), hi.max(data[i][feature])),
            );
            // An overflowing range cannot be sampled from
            (max > min && (max - min).is_finite()).then_some((feature, min, max))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);

    let mut split = 0;
    for i in 0..indices.len() {
        if data[indices[i]][feature] < threshold {
            indices.swap(i, split);
            split += 1;
        }
    }

    let (left, right) = indices.split_at_mut(split);
    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(data, left, depth + 1, max_depth, rng)),
        right: Box::new(grow(data, right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful binary search tree lookup, c(n)
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut data: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![10.0 + (i % 5) as f64, 1.0 + (i % 3) as f64 * 0.1])
            .collect();
        data.push(vec![500.0, 40.0]);
        data
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!((c256 - 10.244_770_920_116_851).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_scores_lowest() {
        let data = cluster_with_outlier();
        let config = ForestConfig {
            contamination: 1.0 / data.len() as f64,
            ..Default::default()
        };

        let result = fit_predict(&data, &config).unwrap();
        let outlier_score = result.scores[30];
        assert!(result.scores[..30].iter().all(|&s| s > outlier_score));
        assert!(result.outliers[30]);
        assert_eq!(result.outliers.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn test_scores_are_reproducible() {
        let data = cluster_with_outlier();
        let config = ForestConfig::default();

        let a = fit_predict(&data, &config).unwrap();
        let b = fit_predict(&data, &config).unwrap();
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.outliers, b.outliers);
    }

    #[test]
    fn test_identical_points_not_flagged() {
        let data = vec![vec![3.0, 3.0]; 8];
        let result = fit_predict(&data, &ForestConfig::default()).unwrap();
        assert!(result.outliers.iter().all(|&f| !f));
        assert!(result.scores.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_extreme_magnitudes_do_not_overflow_splits() {
        let data = vec![
            vec![1e308, 0.5],
            vec![-1e308, 0.5],
            vec![1.0, 0.1],
            vec![2.0, 0.2],
            vec![3.0, 9.0],
        ];
        let result = fit_predict(&data, &ForestConfig::default()).unwrap();
        assert_eq!(result.scores.len(), 5);
        assert!(result.scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_rejects_bad_input() {
        let config = ForestConfig::default();
        assert!(fit_predict(&[], &config).is_err());
        assert!(fit_predict(&[vec![1.0]], &config).is_err());
        assert!(fit_predict(&[vec![1.0], vec![1.0, 2.0]], &config).is_err());
        assert!(fit_predict(&[vec![1.0], vec![f64::NAN]], &config).is_err());

        let bad = ForestConfig {
            contamination: 0.0,
            ..Default::default()
        };
        assert!(fit_predict(&[vec![1.0], vec![2.0]], &bad).is_err());
    }
}
