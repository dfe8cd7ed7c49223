// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// A table read from a data source: a header row and string cells.
///
/// The readers of the command line build tables from CSV or Excel files;
/// everything in this crate only sees column names and strings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    source: String,
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table. `source` is only used in messages.
    pub fn new(source: &str, headers: &[String]) -> Table {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.clone(), idx))
            .collect();
        Table {
            source: source.to_string(),
            headers: headers.to_vec(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The records of the table, in file order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(move |(idx, values)| Record {
            table: self,
            values,
            // Line 1 is the header.
            lineno: idx + 2,
        })
    }
}

/// One row of a table, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    values: &'a [String],
    lineno: usize,
}

impl<'a> Record<'a> {
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    pub fn get(&self, column: &str) -> StatsResult<&'a str> {
        self.table
            .columns
            .get(column)
            .and_then(|idx| self.values.get(*idx))
            .map(|s| s.as_str())
            .ok_or_else(|| StatsError::MissingColumn {
                source: self.table.source.clone(),
                column: column.to_string(),
                lineno: self.lineno,
            })
    }

    /// Reads and parses a numeric cell.
    pub fn quantity<V: Quantity>(&self, column: &str) -> StatsResult<V> {
        let raw = self.get(column)?;
        V::parse_quantity(raw.trim()).ok_or_else(|| StatsError::Parse {
            source: self.table.source.clone(),
            column: column.to_string(),
            value: raw.to_string(),
            lineno: self.lineno,
        })
    }
}

/// Numbers that can be read from a cell and summed by the aggregator.
pub trait Quantity: Copy + PartialEq + std::fmt::Debug {
    /// Parses a non-negative value. Returns None for anything else.
    fn parse_quantity(s: &str) -> Option<Self>;

    /// Sums the values independently of the order in which they were given.
    /// Returns None if the sum does not fit.
    fn total(values: &mut [Self]) -> Option<Self>;

    fn as_f64(&self) -> f64;
}

impl Quantity for u64 {
    fn parse_quantity(s: &str) -> Option<u64> {
        s.parse::<u64>().ok()
    }

    fn total(values: &mut [u64]) -> Option<u64> {
        values.iter().try_fold(0u64, |acc, v| acc.checked_add(*v))
    }

    fn as_f64(&self) -> f64 {
        *self as f64
    }
}

impl Quantity for f64 {
    fn parse_quantity(s: &str) -> Option<f64> {
        match s.parse::<f64>() {
            Ok(x) if x.is_finite() && x >= 0.0 => Some(x),
            _ => None,
        }
    }

    // Floating point addition is not associative: sort first so that any
    // permutation of the same rows gives the same bits.
    fn total(values: &mut [f64]) -> Option<f64> {
        values.sort_by(|a, b| a.total_cmp(b));
        let sum: f64 = values.iter().sum();
        if sum.is_finite() {
            Some(sum)
        } else {
            None
        }
    }

    fn as_f64(&self) -> f64 {
        *self
    }
}

/// The identity of a district. Names of districts are only unique within
/// a province.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct DistrictKey {
    pub province: String,
    pub district: String,
}

impl DistrictKey {
    pub fn new(province: &str, district: &str) -> DistrictKey {
        DistrictKey {
            province: province.to_string(),
            district: district.to_string(),
        }
    }
}

impl Display for DistrictKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.province, self.district)
    }
}

/// The fraction of the total population that is eligible to vote.
///
/// It is the same for every district and province of a dataset, and is
/// validated once at construction.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct VotingFraction(f64);

impl VotingFraction {
    /// A fraction of 1, for plain percentages.
    pub const UNIT: VotingFraction = VotingFraction(1.0);

    pub fn new(value: f64) -> StatsResult<VotingFraction> {
        if value.is_finite() && value > 0.0 {
            Ok(VotingFraction(value))
        } else {
            Err(StatsError::InvalidFraction { value })
        }
    }

    /// Ratio of registered voters to the total population.
    pub fn from_counts(registered_voters: f64, population: f64) -> StatsResult<VotingFraction> {
        if population == 0.0 {
            return Err(StatsError::DivisionByZero {
                key: "votingFraction.population".to_string(),
            });
        }
        VotingFraction::new(registered_voters / population)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// ********* Errors **********

/// Errors that abort a computation. None of them can be recovered from:
/// the inputs are static files.
#[derive(PartialEq, Debug, Clone)]
pub enum StatsError {
    /// A numeric cell could not be read as a non-negative number.
    Parse {
        source: String,
        column: String,
        value: String,
        lineno: usize,
    },
    MissingColumn {
        source: String,
        column: String,
        lineno: usize,
    },
    /// A key that should appear once appeared again.
    DuplicateKey { key: String, lineno: usize },
    UnknownProvince { name: String },
    /// Two mappings that should cover the same keys do not.
    KeyMismatch {
        only_left: Vec<String>,
        only_right: Vec<String>,
    },
    DivisionByZero { key: String },
    /// The sum of the values of a key does not fit the quantity type.
    Overflow { key: String },
    InsufficientData { reason: String },
    InvalidFraction { value: f64 },
}

impl Error for StatsError {}

impl Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::Parse {
                source,
                column,
                value,
                lineno,
            } => write!(
                f,
                "{}:{}: could not read {:?} in column {} as a non-negative number",
                source, lineno, value, column
            ),
            StatsError::MissingColumn {
                source,
                column,
                lineno,
            } => write!(f, "{}:{}: missing column {}", source, lineno, column),
            StatsError::DuplicateKey { key, lineno } => {
                write!(f, "line {}: repeated key {}", lineno, key)
            }
            StatsError::UnknownProvince { name } => {
                write!(f, "unknown province {:?}", name)
            }
            StatsError::KeyMismatch {
                only_left,
                only_right,
            } => write!(
                f,
                "the keys of the two datasets differ: only in the first: {:?}, only in the second: {:?}",
                only_left, only_right
            ),
            StatsError::DivisionByZero { key } => write!(f, "division by zero for {}", key),
            StatsError::Overflow { key } => write!(f, "the total for {} overflows", key),
            StatsError::InsufficientData { reason } => {
                write!(f, "insufficient data: {}", reason)
            }
            StatsError::InvalidFraction { value } => {
                write!(f, "invalid voting-eligible fraction {}", value)
            }
        }
    }
}

pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut t = Table::new(
            "test.csv",
            &["Province".to_string(), "Votes".to_string()],
        );
        t.push_row(vec!["Kabul".to_string(), "12".to_string()]);
        t.push_row(vec!["Herat".to_string(), "-3".to_string()]);
        t.push_row(vec!["Balkh".to_string()]);
        t
    }

    #[test]
    fn record_lookup() {
        let t = table();
        let recs: Vec<Record> = t.records().collect();
        assert_eq!(recs[0].get("Province"), Ok("Kabul"));
        assert_eq!(recs[0].lineno(), 2);
        assert_eq!(recs[0].quantity::<u64>("Votes"), Ok(12));
        assert_eq!(recs[0].quantity::<f64>("Votes"), Ok(12.0));
    }

    #[test]
    fn negative_is_parse_error() {
        let t = table();
        let rec = t.records().nth(1).unwrap();
        assert!(matches!(
            rec.quantity::<f64>("Votes"),
            Err(StatsError::Parse { lineno: 3, .. })
        ));
    }

    #[test]
    fn short_row_is_missing_column() {
        let t = table();
        let rec = t.records().nth(2).unwrap();
        assert!(matches!(
            rec.get("Votes"),
            Err(StatsError::MissingColumn { lineno: 4, .. })
        ));
        assert!(matches!(
            rec.get("District"),
            Err(StatsError::MissingColumn { .. })
        ));
    }

    #[test]
    fn voting_fraction() {
        assert!(VotingFraction::new(0.0).is_err());
        assert!(VotingFraction::new(f64::NAN).is_err());
        let vf = VotingFraction::from_counts(20845988.0, 31822848.0).unwrap();
        assert!((vf.value() - 0.6550636).abs() < 1e-6);
        assert!(VotingFraction::from_counts(1.0, 0.0).is_err());
    }

    #[test]
    fn totals() {
        assert_eq!(u64::total(&mut [3, 4, 5]), Some(12));
        assert_eq!(u64::total(&mut [u64::MAX, 1]), None);
        assert_eq!(f64::total(&mut [0.5, 0.25]), Some(0.75));
        assert_eq!(f64::total(&mut [f64::MAX, f64::MAX]), None);
    }

    #[test]
    fn district_keys_order_by_province_first() {
        let a = DistrictKey::new("Badakhshan", "Yamgan");
        let b = DistrictKey::new("Balkh", "Alburz");
        assert!(a < b);
        assert_eq!(a.to_string(), "(Badakhshan, Yamgan)");
    }
}
