//! Ordinary least squares on one explanatory variable.

use log::debug;
use std::fmt::Display;

use crate::aggregate::Aggregate;
use crate::config::*;
use crate::ratio::check_same_keys;

/// The result of a fit `y = slope * x + intercept`.
#[derive(PartialEq, Debug, Clone)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r: f64,
    pub r_squared: f64,
    /// `y - (slope * x + intercept)`, in the order of the input points.
    pub residuals: Vec<f64>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Closed-form least squares fit.
///
/// When all the y values are equal the correlation is reported as 0.
pub fn linear_fit(points: &[(f64, f64)]) -> StatsResult<LinearFit> {
    let n = points.len();
    if n < 2 {
        return Err(StatsError::InsufficientData {
            reason: format!("a linear fit needs at least 2 points, got {}", n),
        });
    }
    let nf = n as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in points.iter() {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return Err(StatsError::InsufficientData {
            reason: format!("all the {} x values are equal to {}", n, mean_x),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };
    let residuals = points
        .iter()
        .map(|(x, y)| y - (slope * x + intercept))
        .collect();
    debug!(
        "linear_fit: {} points: slope {} intercept {} r {}",
        n, slope, intercept, r
    );
    Ok(LinearFit {
        slope,
        intercept,
        r,
        r_squared: r * r,
        residuals,
    })
}

/// Joins two mappings on their keys, in key order.
pub fn pair_by_key<K>(
    xs: &Aggregate<K, f64>,
    ys: &Aggregate<K, f64>,
) -> StatsResult<Vec<(K, f64, f64)>>
where
    K: Ord + Clone + Display,
{
    check_same_keys(xs, ys)?;
    Ok(xs
        .iter()
        .filter_map(|(k, x)| ys.get(k).map(|y| (k.clone(), x, y)))
        .collect())
}
