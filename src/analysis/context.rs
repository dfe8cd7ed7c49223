use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::analysis::io_common::{read_table, resolve_path};
use crate::analysis::*;

/// The configuration of a run, and the tables and aggregates computed so
/// far. Every file is read at most once per run.
pub struct AnalysisContext {
    pub config: AnalysisConfig,
    /// The directory of the configuration file.
    root: PathBuf,
    voting_fraction: VotingFraction,
    tables: RefCell<HashMap<String, Rc<Table>>>,
    district_population: OnceCell<Aggregate<DistrictKey, u64>>,
    province_population: OnceCell<Aggregate<String, u64>>,
    provinces: OnceCell<ProvinceIndex>,
}

impl AnalysisContext {
    pub fn new(config_path: &str) -> AnalysisResult<AnalysisContext> {
        let config = read_config(config_path)?;
        let root = Path::new(config_path)
            .parent()
            .context(MissingParentDirSnafu {})?
            .to_path_buf();
        let voting_fraction = match &config.voting_fraction {
            Some(vfs) => vfs.voting_fraction()?,
            None => VotingFraction::from_counts(DEFAULT_REGISTERED_VOTERS, DEFAULT_POPULATION)?,
        };
        info!(
            "Configuration {}: {} elections, voting fraction {}",
            config_path,
            config.elections.len(),
            voting_fraction.value()
        );
        Ok(AnalysisContext {
            config,
            root,
            voting_fraction,
            tables: RefCell::new(HashMap::new()),
            district_population: OnceCell::new(),
            province_population: OnceCell::new(),
            provinces: OnceCell::new(),
        })
    }

    pub fn voting_fraction(&self) -> VotingFraction {
        self.voting_fraction
    }

    pub fn election(&self, name: &str) -> AnalysisResult<&ElectionSources> {
        self.config
            .elections
            .iter()
            .find(|e| e.name == name)
            .context(UnknownElectionSnafu {
                name,
                known: self
                    .config
                    .elections
                    .iter()
                    .map(|e| e.name.clone())
                    .collect::<Vec<String>>(),
            })
    }

    pub fn candidate(&self, name: &str) -> AnalysisResult<&CandidateSetting> {
        self.config
            .candidates
            .iter()
            .find(|c| c.name == name)
            .context(UnknownCandidateSnafu {
                name,
                known: self
                    .config
                    .candidates
                    .iter()
                    .map(|c| c.name.clone())
                    .collect::<Vec<String>>(),
            })
    }

    pub fn suspicious_ballot_cap(&self) -> f64 {
        self.config
            .thresholds
            .as_ref()
            .and_then(|t| t.suspicious_ballot_cap)
            .unwrap_or(DEFAULT_SUSPICIOUS_BALLOT_CAP)
    }

    pub fn high_turnout_percent(&self) -> f64 {
        self.config
            .thresholds
            .as_ref()
            .and_then(|t| t.high_turnout_percent)
            .unwrap_or(DEFAULT_HIGH_TURNOUT_PERCENT)
    }

    /// Reads the table of a data source, or returns the copy read before.
    pub fn load(&self, source: &FileSource) -> AnalysisResult<Rc<Table>> {
        let key = format!(
            "{}#{}",
            resolve_path(self.root.as_path(), source.file_path.as_str()).display(),
            source.excel_worksheet_name.as_deref().unwrap_or("")
        );
        if let Some(t) = self.tables.borrow().get(&key) {
            debug!("load: {} already read", key);
            return Ok(t.clone());
        }
        let table = Rc::new(read_table(self.root.as_path(), source)?);
        self.tables.borrow_mut().insert(key, table.clone());
        Ok(table)
    }

    /// The population of every district. A district listed twice is an
    /// error.
    pub fn district_population(&self) -> AnalysisResult<&Aggregate<DistrictKey, u64>> {
        if let Some(agg) = self.district_population.get() {
            return Ok(agg);
        }
        let source = &self.config.population;
        let table = self.load(source)?;
        let rules = source.name_rules();
        let agg: Aggregate<DistrictKey, u64> = aggregate(
            &table,
            by_district(source.province_column(), source.district_column(), &rules),
            source.population_column()?,
            KeyPolicy::Unique,
        )?;
        info!("Population: {} districts", agg.len());
        Ok(self.district_population.get_or_init(|| agg))
    }

    pub fn province_population(&self) -> AnalysisResult<&Aggregate<String, u64>> {
        if let Some(agg) = self.province_population.get() {
            return Ok(agg);
        }
        // Summed from the districts, so that a repeated district is an error
        // at every level.
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for (k, pop) in self.district_population()?.iter() {
            let total = totals.entry(k.province.clone()).or_insert(0);
            *total = total.checked_add(pop).ok_or_else(|| StatsError::Overflow {
                key: k.province.clone(),
            })?;
        }
        let agg = Aggregate::from_map(totals);
        info!("Population: {} provinces", agg.len());
        Ok(self.province_population.get_or_init(|| agg))
    }

    /// The province numbers, taken from the population table.
    pub fn provinces(&self) -> AnalysisResult<&ProvinceIndex> {
        if let Some(idx) = self.provinces.get() {
            return Ok(idx);
        }
        let source = &self.config.population;
        let table = self.load(source)?;
        let rules = source.name_rules();
        let idx = ProvinceIndex::from_table(&table, by_province(source.province_column(), &rules))?;
        Ok(self.provinces.get_or_init(|| idx))
    }

    /// Where to write: the command line wins over the configuration, and
    /// the directory of the configuration is the default.
    pub fn output_target(&self, out: Option<String>) -> AnalysisResult<OutputTarget> {
        let target = match (out.as_deref(), self.config.output_directory.as_deref()) {
            (Some("stdout"), _) | (None, Some("stdout")) => OutputTarget::Stdout,
            (Some(dir), _) => OutputTarget::Directory(PathBuf::from(dir)),
            (None, Some(dir)) => OutputTarget::Directory(resolve_path(self.root.as_path(), dir)),
            (None, None) => OutputTarget::Directory(self.root.clone()),
        };
        debug!("output_target: {:?}", target);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> AnalysisContext {
        AnalysisContext::new(format!("{}/testdata/config.json", env!("CARGO_MANIFEST_DIR")).as_str())
            .unwrap()
    }

    #[test]
    fn output_targets() {
        let ctx = test_context();
        assert_eq!(
            ctx.output_target(Some("stdout".to_string())).unwrap(),
            OutputTarget::Stdout
        );
        assert_eq!(
            ctx.output_target(Some("/tmp/afghanstats".to_string())).unwrap(),
            OutputTarget::Directory(PathBuf::from("/tmp/afghanstats"))
        );
        // outputDirectory is relative to the configuration.
        assert_eq!(
            ctx.output_target(None).unwrap(),
            OutputTarget::Directory(
                [env!("CARGO_MANIFEST_DIR"), "testdata", "out"].iter().collect()
            )
        );
    }

    #[test]
    fn tables_are_read_once() {
        let ctx = test_context();
        let a = ctx.load(&ctx.config.population).unwrap();
        let b = ctx.load(&ctx.config.elections[0].votes).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(ctx.district_population().unwrap().len(), 5);
        assert_eq!(ctx.province_population().unwrap().len(), 4);
        assert_eq!(ctx.voting_fraction().value(), 0.5);
    }

    #[test]
    fn unknown_names() {
        let ctx = test_context();
        assert!(ctx.election("runoff").is_ok());
        assert!(matches!(
            ctx.candidate("Karzai"),
            Err(AnalysisError::UnknownCandidate { .. })
        ));
        assert_eq!(ctx.suspicious_ballot_cap(), 600.0);
        assert_eq!(ctx.high_turnout_percent(), 95.0);
    }

    #[test]
    fn missing_configuration() {
        assert!(matches!(
            AnalysisContext::new("/nonexistent/config.json"),
            Err(AnalysisError::OpeningFile { .. })
        ));
    }
}
