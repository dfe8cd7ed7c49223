use clap::{Parser, Subcommand};

/// Turnout, vote share and winning margin analyses of election datasets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the datasets, the columns to read and the constants of the
    /// election. Relative file paths inside it are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (directory path, 'stdout' or empty) Where to write the output tables. Setting this option overrides
    /// the outputDirectory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (directory path or empty) A directory with reference outputs. If provided, every table produced is
    /// compared to the file of the same name in this directory, and the run fails on any difference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Writes the number assigned to each province.
    Provinces,
    /// Turnout of an election, by district or by province.
    Turnout {
        #[clap(long, value_parser)]
        election: String,
        /// 'district' or 'province'
        #[clap(long, value_parser, default_value = "district")]
        level: String,
    },
    /// Histogram of the district turnouts of an election.
    TurnoutDistribution {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser, default_value_t = 30)]
        bins: usize,
        /// (percent or empty) Upper bound of the histogram. If not provided, the largest turnout is used.
        #[clap(long, value_parser)]
        max: Option<f64>,
    },
    /// Winning margin of a candidate over another one, by province and by district.
    WinningMargin {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        leader: String,
        #[clap(long, value_parser)]
        trailer: String,
    },
    /// Votes of a candidate over the eligible population (V/E) against the turnout, with a linear fit.
    VOverE {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        candidate: String,
    },
    /// Vote share of a candidate against the turnout, with a linear fit.
    VoteShare {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        candidate: String,
    },
    /// Histogram of the vote share of a candidate over the polling stations of a province.
    VoteShareDistribution {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        candidate: String,
        /// The province name, compared without case.
        #[clap(long, value_parser)]
        province: String,
        #[clap(long, value_parser, default_value_t = 25)]
        bins: usize,
    },
    /// Districts with polling stations where one candidate got nothing and the other the whole ballot
    /// cap, and districts with a turnout above the threshold.
    SuspiciousStations {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        leader: String,
        #[clap(long, value_parser)]
        trailer: String,
    },
    /// Change of turnout and of observer deployment between two elections, by province.
    ObserverTrends {
        #[clap(long, value_parser)]
        before: String,
        #[clap(long, value_parser)]
        after: String,
    },
}
