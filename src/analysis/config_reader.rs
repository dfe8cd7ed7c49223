use crate::analysis::*;

use std::collections::BTreeMap;

// Figures from http://www.idea.int/vt/countryview.cfm?CountryCode=AF
pub const DEFAULT_REGISTERED_VOTERS: f64 = 20845988.0;
pub const DEFAULT_POPULATION: f64 = 31822848.0;

pub const DEFAULT_SUSPICIOUS_BALLOT_CAP: f64 = 600.0;
pub const DEFAULT_HIGH_TURNOUT_PERCENT: f64 = 95.0;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "votingFraction")]
    pub voting_fraction: Option<VotingFractionSetting>,
    /// The district populations. This is also the reference for the
    /// province numbers.
    pub population: FileSource,
    pub elections: Vec<ElectionSources>,
    pub candidates: Vec<CandidateSetting>,
    pub thresholds: Option<Thresholds>,
}

/// Either `value`, or `registeredVoters` and `population`.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VotingFractionSetting {
    pub value: Option<f64>,
    #[serde(rename = "registeredVoters")]
    pub registered_voters: Option<f64>,
    pub population: Option<f64>,
}

impl VotingFractionSetting {
    pub fn voting_fraction(&self) -> AnalysisResult<VotingFraction> {
        let vf = match (self.value, self.registered_voters, self.population) {
            (Some(v), None, None) => VotingFraction::new(v)?,
            (None, Some(r), Some(p)) => VotingFraction::from_counts(r, p)?,
            (None, None, None) => {
                VotingFraction::from_counts(DEFAULT_REGISTERED_VOTERS, DEFAULT_POPULATION)?
            }
            x => whatever!(
                "votingFraction: expected either value or registeredVoters and population, got {:?}",
                x
            ),
        };
        Ok(vf)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSources {
    pub name: String,
    /// Votes by district or by polling station.
    pub votes: FileSource,
    /// Votes by polling station, if `votes` is aggregated by district.
    pub stations: Option<FileSource>,
    /// Election observers deployed, by province.
    pub observers: Option<FileSource>,
}

impl ElectionSources {
    pub fn stations(&self) -> &FileSource {
        self.stations.as_ref().unwrap_or(&self.votes)
    }

    pub fn observers(&self) -> AnalysisResult<&FileSource> {
        self.observers.as_ref().context(MissingSettingSnafu {
            setting: "observers".to_string(),
            path: format!("election {}", self.name),
        })
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// csv (default) or xlsx
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "provinceColumn")]
    _province_column: Option<String>,
    #[serde(rename = "districtColumn")]
    _district_column: Option<String>,
    #[serde(rename = "populationColumn")]
    _population_column: Option<String>,
    #[serde(rename = "totalVotesColumn")]
    _total_votes_column: Option<String>,
    #[serde(rename = "observersColumn")]
    _observers_column: Option<String>,
    #[serde(rename = "candidateColumns")]
    pub candidate_columns: Option<BTreeMap<String, String>>,
    pub names: Option<NameRulesSetting>,
}

impl FileSource {
    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("csv")
    }

    pub fn province_column(&self) -> &str {
        self._province_column.as_deref().unwrap_or("Province")
    }

    pub fn district_column(&self) -> &str {
        self._district_column.as_deref().unwrap_or("District")
    }

    pub fn population_column(&self) -> AnalysisResult<&str> {
        self.required(&self._population_column, "populationColumn")
    }

    pub fn total_votes_column(&self) -> AnalysisResult<&str> {
        self.required(&self._total_votes_column, "totalVotesColumn")
    }

    pub fn observers_column(&self) -> AnalysisResult<&str> {
        self.required(&self._observers_column, "observersColumn")
    }

    pub fn candidate_column(&self, candidate: &str) -> AnalysisResult<&str> {
        self.candidate_columns
            .as_ref()
            .and_then(|m| m.get(candidate))
            .map(|s| s.as_str())
            .context(MissingSettingSnafu {
                setting: format!("candidateColumns.{}", candidate),
                path: self.file_path.clone(),
            })
    }

    pub fn name_rules(&self) -> NameRules {
        match &self.names {
            Some(n) => NameRules {
                title_case: n.title_case.unwrap_or(false),
                strip_spaces: n.strip_spaces.unwrap_or(false),
                remove: n.remove.clone().unwrap_or_default(),
                aliases: n.aliases.clone().unwrap_or_default(),
            },
            None => NameRules::default(),
        }
    }

    fn required<'a>(&'a self, x: &'a Option<String>, setting: &str) -> AnalysisResult<&'a str> {
        x.as_deref().context(MissingSettingSnafu {
            setting,
            path: self.file_path.clone(),
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NameRulesSetting {
    #[serde(rename = "titleCase")]
    pub title_case: Option<bool>,
    #[serde(rename = "stripSpaces")]
    pub strip_spaces: Option<bool>,
    pub remove: Option<Vec<String>>,
    pub aliases: Option<BTreeMap<String, String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSetting {
    pub name: String,
    /// Plot color, passed along in the summaries.
    pub color: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Maximum number of ballots in a polling station.
    #[serde(rename = "suspiciousBallotCap")]
    pub suspicious_ballot_cap: Option<f64>,
    #[serde(rename = "highTurnoutPercent")]
    pub high_turnout_percent: Option<f64>,
}

pub fn read_config(path: &str) -> AnalysisResult<AnalysisConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
