//! Building key → sum mappings out of tables.

use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::config::*;
use crate::names::NameRules;

/// What to do when the same key is seen more than once.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum KeyPolicy {
    /// Repeated keys are expected (one row per polling station), and summed.
    Sum,
    /// Every key must be present once (one population figure per district).
    Unique,
}

/// An ordered mapping from keys to aggregated quantities.
///
/// Built once, never modified afterwards.
#[derive(PartialEq, Debug, Clone)]
pub struct Aggregate<K: Ord, V> {
    values: BTreeMap<K, V>,
}

impl<K: Ord + Clone, V: Copy> Aggregate<K, V> {
    pub fn from_map(values: BTreeMap<K, V>) -> Aggregate<K, V> {
        Aggregate { values }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.values.get(key).copied()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = V> + '_ {
        self.values.values().copied()
    }

    /// The entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, V)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }
}

/// Sums a per-record value by key.
///
/// `key_fn` and `value_fn` may fail, for instance on a missing column or on a
/// malformed number; the first failure is returned.
pub fn aggregate_with<K, V, KF, VF>(
    table: &Table,
    key_fn: KF,
    value_fn: VF,
    policy: KeyPolicy,
) -> StatsResult<Aggregate<K, V>>
where
    K: Ord + Clone + Display,
    V: Quantity,
    KF: Fn(&Record) -> StatsResult<K>,
    VF: Fn(&Record) -> StatsResult<V>,
{
    let mut collected: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for rec in table.records() {
        let key = key_fn(&rec)?;
        let value = value_fn(&rec)?;
        match collected.entry(key) {
            Entry::Occupied(mut e) => {
                if policy == KeyPolicy::Unique {
                    return Err(StatsError::DuplicateKey {
                        key: e.key().to_string(),
                        lineno: rec.lineno(),
                    });
                }
                e.get_mut().push(value);
            }
            Entry::Vacant(e) => {
                e.insert(vec![value]);
            }
        }
    }
    let mut values: BTreeMap<K, V> = BTreeMap::new();
    for (k, mut vs) in collected.into_iter() {
        let total = V::total(&mut vs).ok_or_else(|| StatsError::Overflow { key: k.to_string() })?;
        values.insert(k, total);
    }
    debug!(
        "aggregate_with: {}: {} rows into {} keys ({:?})",
        table.source(),
        table.len(),
        values.len(),
        policy
    );
    Ok(Aggregate { values })
}

/// Sums a numeric column by key.
pub fn aggregate<K, V, KF>(
    table: &Table,
    key_fn: KF,
    column: &str,
    policy: KeyPolicy,
) -> StatsResult<Aggregate<K, V>>
where
    K: Ord + Clone + Display,
    V: Quantity,
    KF: Fn(&Record) -> StatsResult<K>,
{
    aggregate_with(table, key_fn, |rec| rec.quantity::<V>(column), policy)
}

/// Keys records by their province name.
pub fn by_province<'a>(
    province_column: &'a str,
    rules: &'a NameRules,
) -> impl Fn(&Record) -> StatsResult<String> + 'a {
    move |rec| Ok(rules.apply(rec.get(province_column)?))
}

/// Keys records by their (province, district) pair.
pub fn by_district<'a>(
    province_column: &'a str,
    district_column: &'a str,
    rules: &'a NameRules,
) -> impl Fn(&Record) -> StatsResult<DistrictKey> + 'a {
    move |rec| {
        Ok(DistrictKey {
            province: rules.apply(rec.get(province_column)?),
            district: rules.apply(rec.get(district_column)?),
        })
    }
}
