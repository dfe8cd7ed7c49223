//! Stable province numbers.
//!
//! A province is numbered by its rank in the sorted list of all the distinct
//! province names of a reference table. The numbers are used as the x axis
//! of the province-level outputs.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::aggregate::Aggregate;
use crate::config::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProvinceIndex {
    // Sorted, without duplicates.
    names: Vec<String>,
    numbers: HashMap<String, usize>,
}

impl ProvinceIndex {
    pub fn from_names<I, S>(names: I) -> ProvinceIndex
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = names.into_iter().map(|s| s.into()).collect();
        let names: Vec<String> = distinct.into_iter().collect();
        let numbers = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        ProvinceIndex { names, numbers }
    }

    /// Numbers the provinces found in a table, keyed with `key_fn`.
    pub fn from_table<F>(table: &Table, key_fn: F) -> StatsResult<ProvinceIndex>
    where
        F: Fn(&Record) -> StatsResult<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for rec in table.records() {
            names.push(key_fn(&rec)?);
        }
        let index = ProvinceIndex::from_names(names);
        debug!(
            "ProvinceIndex::from_table: {}: {} provinces",
            table.source(),
            index.len()
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> StatsResult<usize> {
        self.numbers
            .get(name)
            .copied()
            .ok_or_else(|| StatsError::UnknownProvince {
                name: name.to_string(),
            })
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    /// All the (number, name) pairs, by increasing number.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(idx, s)| (idx, s.as_str()))
    }

    /// Rekeys a mapping by province number.
    pub fn renumber<V: Copy>(
        &self,
        by_name: &Aggregate<String, V>,
    ) -> StatsResult<Aggregate<usize, V>> {
        let mut res: BTreeMap<usize, V> = BTreeMap::new();
        for (name, v) in by_name.iter() {
            res.insert(self.index_of(name)?, v);
        }
        Ok(Aggregate::from_map(res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_total() {
        let idx = ProvinceIndex::from_names(["Kabul", "Badakhshan", "Kabul", "Herat", "Zabul"]);
        assert_eq!(idx.len(), 4);
        let pairs: Vec<(usize, &str)> = idx.iter().collect();
        assert_eq!(
            pairs,
            vec![(0, "Badakhshan"), (1, "Herat"), (2, "Kabul"), (3, "Zabul")]
        );
        for (num, name) in idx.iter() {
            assert_eq!(idx.index_of(name), Ok(num));
            assert_eq!(idx.name_of(num), Some(name));
        }
    }

    #[test]
    fn deterministic_whatever_the_order() {
        let a = ProvinceIndex::from_names(["Kabul", "Herat", "Balkh"]);
        let b = ProvinceIndex::from_names(["Balkh", "Kabul", "Herat", "Kabul"]);
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_province() {
        let idx = ProvinceIndex::from_names(["Kunar"]);
        assert_eq!(
            idx.index_of("Kunarha"),
            Err(StatsError::UnknownProvince {
                name: "Kunarha".to_string()
            })
        );
        assert_eq!(idx.name_of(1), None);
    }

    #[test]
    fn renumbering() {
        let idx = ProvinceIndex::from_names(["Kabul", "Herat"]);
        let mut m = BTreeMap::new();
        m.insert("Kabul".to_string(), 3.0);
        m.insert("Herat".to_string(), 4.0);
        let by_num = idx.renumber(&Aggregate::from_map(m.clone())).unwrap();
        assert_eq!(by_num.get(&0), Some(4.0));
        assert_eq!(by_num.get(&1), Some(3.0));

        m.insert("Ghor".to_string(), 1.0);
        assert!(idx.renumber(&Aggregate::from_map(m)).is_err());
    }

    #[test]
    fn from_table_uses_the_key_function() {
        let mut t = Table::new("pop.csv", &["Province".to_string()]);
        for p in ["Kabul", "Herat", "Kabul"] {
            t.push_row(vec![p.to_string()]);
        }
        let idx = ProvinceIndex::from_table(&t, |rec| Ok(rec.get("Province")?.to_uppercase()))
            .unwrap();
        assert_eq!(idx.index_of("HERAT"), Ok(0));
        assert_eq!(idx.index_of("KABUL"), Ok(1));
    }
}
