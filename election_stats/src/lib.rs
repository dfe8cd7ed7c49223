/*!
Aggregation, turnout ratios and regressions over election tables.

The computations of this crate are pure: tables come in, ordered mappings
come out. Reading files and writing results is left to the caller (see the
`afghanstats` command line).

```
use election_stats::*;

let headers = vec!["Province".to_string(), "Pop".to_string(), "Voted".to_string()];
let mut table = Table::new("example", &headers);
table.push_row(vec!["Kabul".to_string(), "1000".to_string(), "300".to_string()]);

let rules = NameRules::default();
let pop: Aggregate<String, u64> =
    aggregate(&table, by_province("Province", &rules), "Pop", KeyPolicy::Unique)?;
let votes: Aggregate<String, f64> =
    aggregate(&table, by_province("Province", &rules), "Voted", KeyPolicy::Sum)?;
let turnout = ratio_percent(&votes, &pop, VotingFraction::new(0.6)?)?;
assert!((turnout.get(&"Kabul".to_string()).unwrap() - 50.0).abs() < 1e-9);
# Ok::<(), StatsError>(())
```
*/

mod config;

pub mod aggregate;
pub mod distribution;
pub mod manual;
pub mod names;
pub mod provinces;
pub mod ratio;
pub mod regression;

pub use crate::aggregate::{aggregate, aggregate_with, by_district, by_province, Aggregate, KeyPolicy};
pub use crate::config::*;
pub use crate::distribution::{z_scores, Histogram};
pub use crate::names::NameRules;
pub use crate::provinces::ProvinceIndex;
pub use crate::ratio::{check_same_keys, percent, percent_change, ratio_percent, share_percent};
pub use crate::regression::{linear_fit, pair_by_key, LinearFit};
