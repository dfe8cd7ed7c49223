// Reading CSV files into tables.

use crate::analysis::io_common::simplify_file_name;
use crate::analysis::*;

pub fn read_csv_table(path: &str) -> AnalysisResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    // Files saved from Excel start with a byte order mark.
    if let Some(first) = headers.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }
    debug!("read_csv_table: {}: headers {:?}", path, headers);

    let mut table = Table::new(simplify_file_name(path).as_str(), &headers);
    for line_r in rdr.records() {
        let line = line_r.context(CsvLineParseSnafu { path })?;
        table.push_row(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(table)
}
