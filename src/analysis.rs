use log::{debug, info, warn};

use election_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::analysis::config_reader::*;
use crate::analysis::context::AnalysisContext;
use crate::analysis::output::*;
use crate::args::{Args, Command};

pub mod config_reader;
pub mod context;
mod fits;
mod io_common;
mod io_csv;
mod io_excel;
mod margins;
mod observers;
pub mod output;
mod shares;
mod stations;
mod turnout;

#[derive(Debug, Snafu)]
pub enum AnalysisError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading a line of {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("{path}:{lineno}: cannot read cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Unknown provider {provider} for {path} (expected csv or xlsx)"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error formatting the table {name}"))]
    WritingCsv { source: csv::Error, name: String },
    #[snafu(display("Error formatting the summary {name}"))]
    WritingJson {
        source: serde_json::Error,
        name: String,
    },
    #[snafu(display("The computation failed"))]
    Stats { source: StatsError },
    #[snafu(display("Unknown election {name}, the configured elections are {known:?}"))]
    UnknownElection { name: String, known: Vec<String> },
    #[snafu(display("Unknown candidate {name}, the configured candidates are {known:?}"))]
    UnknownCandidate { name: String, known: Vec<String> },
    #[snafu(display("The data source {path} needs the setting {setting}"))]
    MissingSetting { setting: String, path: String },
    #[snafu(display("The output {name} differs from the reference {path}"))]
    ReferenceMismatch { name: String, path: String },
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl From<StatsError> for AnalysisError {
    fn from(source: StatsError) -> AnalysisError {
        AnalysisError::Stats { source }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Runs the analysis requested on the command line and writes its outputs.
pub fn run_analysis(args: &Args) -> AnalysisResult<()> {
    let ctx = AnalysisContext::new(args.config.as_str())?;
    let output = compute(&ctx, &args.command)?;

    // Everything is computed: compare before writing anything.
    if let Some(reference_dir) = args.reference.clone() {
        check_reference(&output, Path::new(reference_dir.as_str()))?;
    }

    let target = ctx.output_target(args.out.clone())?;
    write_output(&output, &target)?;
    Ok(())
}

pub fn compute(ctx: &AnalysisContext, command: &Command) -> AnalysisResult<AnalysisOutput> {
    info!("Running {:?}", command);
    match command {
        Command::Provinces => turnout::run_provinces(ctx),
        Command::Turnout { election, level } => turnout::run_turnout(ctx, election, level),
        Command::TurnoutDistribution {
            election,
            bins,
            max,
        } => turnout::run_turnout_distribution(ctx, election, *bins, *max),
        Command::WinningMargin {
            election,
            leader,
            trailer,
        } => margins::run_winning_margin(ctx, election, leader, trailer),
        Command::VOverE {
            election,
            candidate,
        } => fits::run_fit(ctx, election, candidate, fits::FitKind::VOverE),
        Command::VoteShare {
            election,
            candidate,
        } => fits::run_fit(ctx, election, candidate, fits::FitKind::VoteShare),
        Command::VoteShareDistribution {
            election,
            candidate,
            province,
            bins,
        } => shares::run_vote_share_distribution(ctx, election, candidate, province, *bins),
        Command::SuspiciousStations {
            election,
            leader,
            trailer,
        } => stations::run_suspicious_stations(ctx, election, leader, trailer),
        Command::ObserverTrends { before, after } => {
            observers::run_observer_trends(ctx, before, after)
        }
    }
}

/// Compares every produced table with the file of the same name.
fn check_reference(output: &AnalysisOutput, reference_dir: &Path) -> AnalysisResult<()> {
    for table in output.tables.iter() {
        let p: PathBuf = reference_dir.join(table.name.as_str());
        let path = p.as_path().display().to_string();
        info!("Comparing {} with the reference {}", table.name, path);
        let reference = fs::read_to_string(&p).context(OpeningFileSnafu { path: path.clone() })?;
        let produced = table.to_csv_string()?;
        if reference.trim_end() != produced.trim_end() {
            warn!("Found differences with the reference {}", path);
            print_diff(reference.as_str(), produced.as_str(), "\n");
            return Err(AnalysisError::ReferenceMismatch {
                name: table.name.clone(),
                path,
            });
        }
        debug!("check_reference: {} matches", table.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> AnalysisContext {
        let test_dir = option_env!("STATS_TEST_DIR")
            .map(|s| s.to_string())
            .unwrap_or(format!("{}/testdata", env!("CARGO_MANIFEST_DIR")));
        AnalysisContext::new(format!("{}/config.json", test_dir).as_str()).unwrap()
    }

    fn reference_dir() -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "testdata", "reference"]
            .iter()
            .collect()
    }

    fn table<'a>(output: &'a AnalysisOutput, name: &str) -> &'a OutputTable {
        output
            .tables
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("missing table {}", name))
    }

    fn cell(t: &OutputTable, row: usize, column: &str) -> String {
        let idx = t.headers.iter().position(|h| h == column).unwrap();
        t.rows[row][idx].clone()
    }

    fn run(command: Command) -> AnalysisResult<AnalysisOutput> {
        compute(&test_context(), &command)
    }

    #[test]
    fn provinces_match_reference() {
        let out = run(Command::Provinces).unwrap();
        check_reference(&out, &reference_dir()).unwrap();
    }

    #[test]
    fn province_turnout_matches_reference() {
        let out = run(Command::Turnout {
            election: "runoff".to_string(),
            level: "province".to_string(),
        })
        .unwrap();
        check_reference(&out, &reference_dir()).unwrap();
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let out = run(Command::Turnout {
            election: "first_round".to_string(),
            level: "province".to_string(),
        })
        .unwrap();
        // Same name as the runoff reference, different numbers.
        let mut renamed = out.clone();
        renamed.tables[0].name = "runoff_turnout_by_province.csv".to_string();
        assert!(matches!(
            check_reference(&renamed, &reference_dir()),
            Err(AnalysisError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn district_turnout_with_name_rules() {
        let out = run(Command::Turnout {
            election: "first_round".to_string(),
            level: "district".to_string(),
        })
        .unwrap();
        let t = table(&out, "first_round_turnout_by_district.csv");
        assert_eq!(t.rows.len(), 5);
        // Upper case province names and the Kunarha spelling are reconciled.
        assert_eq!(
            t.rows[3],
            vec!["Kunar".to_string(), "Asadabad".to_string(), "20".to_string()]
        );
        // Two rows for Paghman, summed.
        assert_eq!(cell(t, 2, "turnout"), "50");
    }

    #[test]
    fn unknown_level_and_election() {
        assert!(run(Command::Turnout {
            election: "runoff".to_string(),
            level: "village".to_string(),
        })
        .is_err());
        assert!(matches!(
            run(Command::Turnout {
                election: "second_runoff".to_string(),
                level: "district".to_string(),
            }),
            Err(AnalysisError::UnknownElection { .. })
        ));
    }

    #[test]
    fn turnout_distribution() {
        let out = run(Command::TurnoutDistribution {
            election: "runoff".to_string(),
            bins: 4,
            max: Some(100.0),
        })
        .unwrap();
        let t = table(&out, "runoff_turnout_distribution.csv");
        let counts: Vec<String> = (0..t.rows.len()).map(|r| cell(t, r, "count")).collect();
        // 3 districts at 60%, 2 above 100%.
        assert_eq!(counts, vec!["0", "0", "3", "0", "0", "2"]);
    }

    #[test]
    fn winning_margin() {
        let out = run(Command::WinningMargin {
            election: "runoff".to_string(),
            leader: "Ghani".to_string(),
            trailer: "Abdullah".to_string(),
        })
        .unwrap();
        let p = table(&out, "runoff_wma_by_province.csv");
        assert_eq!(cell(p, 3, "province"), "Paktika");
        assert_eq!(cell(p, 3, "turnout_minus_50"), "110");
        assert_eq!(cell(p, 3, "winning_margin"), "95");
        assert_eq!(cell(p, 2, "winning_margin"), "0");
        let d = table(&out, "runoff_wma_by_district.csv");
        assert_eq!(d.rows.len(), 5);
    }

    #[test]
    fn v_over_e_fit() {
        let out = run(Command::VOverE {
            election: "runoff".to_string(),
            candidate: "Ghani".to_string(),
        })
        .unwrap();
        let t = table(&out, "runoff_ghani_v_over_e_vs_t.csv");
        assert_eq!(cell(t, 4, "district"), "Urgun");
        assert_eq!(cell(t, 4, "v_over_e"), "156");
        let (name, summary) = out.summary.clone().unwrap();
        assert_eq!(name, "runoff_ghani_v_over_e_vs_t.json");
        assert_eq!(summary["points"], json!(5));
        assert_eq!(summary["color"], json!("#1AC08E"));
        assert!(summary["slope"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn vote_share_fit_and_unknown_candidate() {
        let out = run(Command::VoteShare {
            election: "runoff".to_string(),
            candidate: "Abdullah".to_string(),
        })
        .unwrap();
        let t = table(&out, "runoff_abdullah_vote_share_vs_t.csv");
        // Kabul/Bagrami: 300 of 600.
        assert_eq!(cell(t, 1, "vote_share"), "50");
        let residuals: f64 = (0..t.rows.len())
            .map(|r| cell(t, r, "residual").parse::<f64>().unwrap())
            .sum();
        assert!(residuals.abs() < 1e-9);

        assert!(matches!(
            run(Command::VoteShare {
                election: "runoff".to_string(),
                candidate: "Karzai".to_string(),
            }),
            Err(AnalysisError::UnknownCandidate { .. })
        ));
    }

    #[test]
    fn vote_share_distribution() {
        let out = run(Command::VoteShareDistribution {
            election: "runoff".to_string(),
            candidate: "Ghani".to_string(),
            province: "kabul".to_string(),
            bins: 25,
        })
        .unwrap();
        let t = table(&out, "ghani_kabul_distrib.csv");
        assert_eq!(t.rows.len(), 25);
        assert_eq!(cell(t, 0, "count"), "1");
        assert_eq!(cell(t, 12, "count"), "1");
        assert_eq!(cell(t, 24, "count"), "1");

        assert!(matches!(
            run(Command::VoteShareDistribution {
                election: "runoff".to_string(),
                candidate: "Ghani".to_string(),
                province: "Atlantis".to_string(),
                bins: 25,
            }),
            Err(AnalysisError::Stats {
                source: StatsError::UnknownProvince { .. }
            })
        ));
    }

    #[test]
    fn suspicious_stations() {
        let out = run(Command::SuspiciousStations {
            election: "runoff".to_string(),
            leader: "Ghani".to_string(),
            trailer: "Abdullah".to_string(),
        })
        .unwrap();
        let s = table(&out, "runoff_suspicious_stations.csv");
        assert_eq!(s.rows.len(), 2);
        assert_eq!(cell(s, 0, "district"), "Paghman");
        assert_eq!(cell(s, 0, "flagged_stations"), "2");
        let h = table(&out, "runoff_high_turnout_districts.csv");
        assert_eq!(h.rows.len(), 2);
        assert_eq!(cell(h, 0, "district"), "Urgun");
        assert_eq!(cell(h, 1, "turnout"), "140");
    }

    #[test]
    fn observer_trends() {
        let out = run(Command::ObserverTrends {
            before: "first_round".to_string(),
            after: "runoff".to_string(),
        })
        .unwrap();
        let t = table(&out, "observer_turnout_change.csv");
        assert_eq!(t.rows.len(), 4);
        assert_eq!(cell(t, 0, "province"), "Herat");
        assert_eq!(cell(t, 0, "turnout_change"), "180");
        assert_eq!(cell(t, 3, "turnout_change"), "700");
        // Herat gained observers, Paktika lost some.
        assert!(cell(t, 0, "observer_z_change").parse::<f64>().unwrap() > 0.0);
        assert!(cell(t, 3, "observer_z_change").parse::<f64>().unwrap() < 0.0);
        let (_, summary) = out.summary.clone().unwrap();
        assert_eq!(summary["points"], json!(4));
    }

    #[test]
    fn missing_observer_source() {
        let res = run(Command::ObserverTrends {
            before: "runoff".to_string(),
            after: "first_round_raw".to_string(),
        });
        assert!(matches!(res, Err(AnalysisError::MissingSetting { .. })));
    }

    #[test]
    fn name_drift_fails_loudly() {
        // Without the alias, Kunarha has votes but no population.
        let res = run(Command::Turnout {
            election: "first_round_raw".to_string(),
            level: "district".to_string(),
        });
        match res {
            Err(AnalysisError::Stats {
                source:
                    StatsError::KeyMismatch {
                        only_left,
                        only_right,
                    },
            }) => {
                assert_eq!(only_left, vec!["(Kunarha, Asadabad)".to_string()]);
                assert_eq!(only_right, vec!["(Kunar, Asadabad)".to_string()]);
            }
            x => panic!("expected a key mismatch, got {:?}", x),
        }
    }

    #[test]
    fn repeated_district_fails_at_every_level() {
        let ctx = AnalysisContext::new(
            format!(
                "{}/testdata/duplicate_district/config.json",
                env!("CARGO_MANIFEST_DIR")
            )
            .as_str(),
        )
        .unwrap();
        for level in ["district", "province"] {
            let res = compute(
                &ctx,
                &Command::Turnout {
                    election: "runoff".to_string(),
                    level: level.to_string(),
                },
            );
            assert!(
                matches!(
                    res,
                    Err(AnalysisError::Stats {
                        source: StatsError::DuplicateKey { lineno: 3, .. }
                    })
                ),
                "{}: {:?}",
                level,
                res
            );
        }
    }

    #[test]
    fn writes_output_directory() {
        let out = run(Command::Provinces).unwrap();
        let dir = std::env::temp_dir().join(format!("afghanstats-test-{}", std::process::id()));
        write_output(&out, &OutputTarget::Directory(dir.clone())).unwrap();
        let written = fs::read_to_string(dir.join("num_to_province.csv")).unwrap();
        assert!(written.starts_with("number,province\n0,Herat\n"));
        fs::remove_dir_all(dir).unwrap();
    }
}
