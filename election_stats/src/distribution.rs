//! Descriptive statistics over the values of an aggregate.

use std::collections::BTreeMap;

use crate::aggregate::Aggregate;
use crate::config::*;

/// Standard scores `(v - mean) / std`, with the population standard
/// deviation.
pub fn z_scores<K, V>(values: &Aggregate<K, V>) -> StatsResult<Aggregate<K, f64>>
where
    K: Ord + Clone,
    V: Quantity,
{
    let n = values.len();
    if n < 2 {
        return Err(StatsError::InsufficientData {
            reason: format!("z-scores need at least 2 values, got {}", n),
        });
    }
    let nf = n as f64;
    let mean = values.values().map(|v| v.as_f64()).sum::<f64>() / nf;
    let var = values
        .values()
        .map(|v| (v.as_f64() - mean).powi(2))
        .sum::<f64>()
        / nf;
    let std = var.sqrt();
    if std == 0.0 {
        return Err(StatsError::InsufficientData {
            reason: format!("all the {} values are equal to {}", n, mean),
        });
    }
    let res: BTreeMap<K, f64> = values
        .iter()
        .map(|(k, v)| (k.clone(), (v.as_f64() - mean) / std))
        .collect();
    Ok(Aggregate::from_map(res))
}

/// Counts of values in equal-width bins.
#[derive(PartialEq, Debug, Clone)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<u64>,
    /// Values strictly below `lower`.
    pub below: u64,
    /// Values strictly above `upper`.
    pub above: u64,
}

impl Histogram {
    /// Bins `[lower, upper]` into `bins` intervals. Every interval is
    /// half-open except the last one, which includes `upper`.
    pub fn build(values: &[f64], bins: usize, lower: f64, upper: f64) -> StatsResult<Histogram> {
        if bins == 0 || !(upper > lower) || !lower.is_finite() || !upper.is_finite() {
            return Err(StatsError::InsufficientData {
                reason: format!(
                    "cannot build {} bins over [{}, {}]",
                    bins, lower, upper
                ),
            });
        }
        let mut h = Histogram {
            lower,
            upper,
            counts: vec![0; bins],
            below: 0,
            above: 0,
        };
        let width = (upper - lower) / bins as f64;
        for v in values.iter() {
            if *v < lower {
                h.below += 1;
            } else if *v > upper {
                h.above += 1;
            } else {
                let idx = (((v - lower) / width) as usize).min(bins - 1);
                h.counts[idx] += 1;
            }
        }
        Ok(h)
    }

    /// The `[start, end]` edges of bin `idx`.
    pub fn edges(&self, idx: usize) -> (f64, f64) {
        let width = (self.upper - self.lower) / self.counts.len() as f64;
        let start = self.lower + width * idx as f64;
        let end = if idx + 1 == self.counts.len() {
            self.upper
        } else {
            self.lower + width * (idx + 1) as f64
        };
        (start, end)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.below + self.above
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scores() {
        let mut m = BTreeMap::new();
        m.insert("a", 1u64);
        m.insert("b", 2u64);
        m.insert("c", 3u64);
        let z = z_scores(&Aggregate::from_map(m)).unwrap();
        let expected = (1.5f64).sqrt();
        assert!((z.get(&"a").unwrap() + expected).abs() < 1e-12);
        assert_eq!(z.get(&"b"), Some(0.0));
        assert!((z.get(&"c").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn constant_values_have_no_z_scores() {
        let mut m = BTreeMap::new();
        m.insert("a", 4.0);
        m.insert("b", 4.0);
        assert!(z_scores(&Aggregate::from_map(m)).is_err());
        let mut m = BTreeMap::new();
        m.insert("a", 4.0);
        assert!(z_scores(&Aggregate::from_map(m)).is_err());
    }

    #[test]
    fn bins() {
        let h = Histogram::build(&[0.0, 10.0, 25.0, 49.9, 100.0, 120.0, -1.0], 4, 0.0, 100.0)
            .unwrap();
        assert_eq!(h.counts, vec![2, 2, 0, 1]);
        assert_eq!(h.above, 1);
        assert_eq!(h.below, 1);
        assert_eq!(h.total(), 7);
        assert_eq!(h.edges(0), (0.0, 25.0));
        assert_eq!(h.edges(3), (75.0, 100.0));
    }

    #[test]
    fn bad_ranges() {
        assert!(Histogram::build(&[1.0], 0, 0.0, 1.0).is_err());
        assert!(Histogram::build(&[1.0], 3, 1.0, 1.0).is_err());
        assert!(Histogram::build(&[1.0], 3, 0.0, f64::NAN).is_err());
    }
}
