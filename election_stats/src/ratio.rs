//! Turnout and other percentages derived from two aggregates.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::aggregate::Aggregate;
use crate::config::*;

/// `100 * numerator / denominator`, refusing a zero denominator.
pub fn percent(numerator: f64, denominator: f64, key: &dyn Display) -> StatsResult<f64> {
    if denominator == 0.0 {
        return Err(StatsError::DivisionByZero {
            key: key.to_string(),
        });
    }
    Ok(100.0 * numerator / denominator)
}

/// Fails unless both mappings cover exactly the same keys.
pub fn check_same_keys<K, A, B>(left: &Aggregate<K, A>, right: &Aggregate<K, B>) -> StatsResult<()>
where
    K: Ord + Clone + Display,
    A: Copy,
    B: Copy,
{
    let only_left: Vec<String> = left
        .keys()
        .filter(|k| !right.contains_key(k))
        .map(|k| k.to_string())
        .collect();
    let only_right: Vec<String> = right
        .keys()
        .filter(|k| !left.contains_key(k))
        .map(|k| k.to_string())
        .collect();
    if only_left.is_empty() && only_right.is_empty() {
        Ok(())
    } else {
        Err(StatsError::KeyMismatch {
            only_left,
            only_right,
        })
    }
}

/// Computes `100 * numerator / (denominator * fraction)` for every key.
///
/// With the votes cast as numerator, the population as denominator and the
/// voting-eligible fraction, this is the turnout. Values above 100 are kept:
/// they are what the analyses look for.
pub fn ratio_percent<K, N, D>(
    numerator: &Aggregate<K, N>,
    denominator: &Aggregate<K, D>,
    fraction: VotingFraction,
) -> StatsResult<Aggregate<K, f64>>
where
    K: Ord + Clone + Display,
    N: Quantity,
    D: Quantity,
{
    check_same_keys(numerator, denominator)?;
    let mut res: BTreeMap<K, f64> = BTreeMap::new();
    for (k, n) in numerator.iter() {
        // Present by the check above.
        let d = denominator.get(k).map(|d| d.as_f64()).unwrap_or(0.0);
        let v = percent(n.as_f64(), d * fraction.value(), k)?;
        res.insert(k.clone(), v);
    }
    Ok(Aggregate::from_map(res))
}

/// Plain percentages, for instance the vote share of a candidate.
pub fn share_percent<K, N, D>(
    numerator: &Aggregate<K, N>,
    denominator: &Aggregate<K, D>,
) -> StatsResult<Aggregate<K, f64>>
where
    K: Ord + Clone + Display,
    N: Quantity,
    D: Quantity,
{
    ratio_percent(numerator, denominator, VotingFraction::UNIT)
}

/// Relative change between two values of the same quantity, in percent of
/// the first one.
pub fn percent_change<K>(
    before: &Aggregate<K, f64>,
    after: &Aggregate<K, f64>,
) -> StatsResult<Aggregate<K, f64>>
where
    K: Ord + Clone + Display,
{
    check_same_keys(before, after)?;
    let mut res: BTreeMap<K, f64> = BTreeMap::new();
    for (k, b) in before.iter() {
        let a = after.get(k).unwrap_or(b);
        res.insert(k.clone(), percent(a - b, b, k)?);
    }
    Ok(Aggregate::from_map(res))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg<V: Copy>(entries: &[(&str, V)]) -> Aggregate<String, V> {
        Aggregate::from_map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        )
    }

    #[test]
    fn kabul_turnout() {
        let pop: Aggregate<String, u64> = agg(&[("Kabul", 1000)]);
        let votes: Aggregate<String, f64> = agg(&[("Kabul", 300.0)]);
        let vf = VotingFraction::new(0.6).unwrap();
        let t = ratio_percent(&votes, &pop, vf).unwrap();
        assert!((t.get(&"Kabul".to_string()).unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn matches_the_formula() {
        for (v, p, f) in [(1.0, 3.0, 0.7), (123456.0, 17.0, 0.01), (5.5, 1e9, 1.0)] {
            let vf = VotingFraction::new(f).unwrap();
            let t = ratio_percent(&agg(&[("A", v)]), &agg(&[("A", p)]), vf).unwrap();
            assert_eq!(t.get(&"A".to_string()), Some(100.0 * v / (p * f)));
        }
    }

    #[test]
    fn not_clamped() {
        let t = share_percent(&agg(&[("A", 900u64)]), &agg(&[("A", 300u64)])).unwrap();
        assert_eq!(t.get(&"A".to_string()), Some(300.0));
    }

    #[test]
    fn key_mismatch() {
        let num: Aggregate<String, f64> = agg(&[("A", 1.0), ("B", 2.0)]);
        let den: Aggregate<String, f64> = agg(&[("A", 1.0)]);
        assert_eq!(
            ratio_percent(&num, &den, VotingFraction::UNIT),
            Err(StatsError::KeyMismatch {
                only_left: vec!["B".to_string()],
                only_right: vec![],
            })
        );
        assert!(ratio_percent(&den, &num, VotingFraction::UNIT).is_err());
        assert!(ratio_percent(&num, &num, VotingFraction::UNIT).is_ok());
    }

    #[test]
    fn zero_population() {
        let num: Aggregate<String, f64> = agg(&[("A", 1.0)]);
        let den: Aggregate<String, u64> = agg(&[("A", 0)]);
        assert_eq!(
            share_percent(&num, &den),
            Err(StatsError::DivisionByZero {
                key: "A".to_string()
            })
        );
    }

    #[test]
    fn change() {
        let before = agg(&[("A", 40.0), ("B", 50.0)]);
        let after = agg(&[("A", 50.0), ("B", 25.0)]);
        let c = percent_change(&before, &after).unwrap();
        assert_eq!(c.get(&"A".to_string()), Some(25.0));
        assert_eq!(c.get(&"B".to_string()), Some(-50.0));
        assert!(percent_change(&agg(&[("A", 0.0)]), &agg(&[("A", 1.0)])).is_err());
    }
}
