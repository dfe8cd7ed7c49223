use crate::analysis::*;

/// A table to be written as a CSV file.
#[derive(PartialEq, Debug, Clone)]
pub struct OutputTable {
    /// The file name, also used to find the reference.
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn new(name: &str, headers: &[&str]) -> OutputTable {
        OutputTable {
            name: name.to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len(), "{}", self.name);
        self.rows.push(row);
    }

    pub fn to_csv_string(&self) -> AnalysisResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&self.headers)
            .context(WritingCsvSnafu { name: &self.name })?;
        for row in self.rows.iter() {
            wtr.write_record(row)
                .context(WritingCsvSnafu { name: &self.name })?;
        }
        let bytes = match wtr.into_inner() {
            Ok(b) => b,
            Err(e) => {
                return Err(AnalysisError::WritingFile {
                    source: e.into_error(),
                    path: self.name.clone(),
                })
            }
        };
        match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(e) => whatever!("table {} is not valid UTF-8: {}", self.name, e),
        }
    }
}

/// Everything a command produces.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AnalysisOutput {
    pub tables: Vec<OutputTable>,
    /// File name and content of a JSON summary.
    pub summary: Option<(String, JSValue)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

/// Numbers are written with the shortest representation that reads back
/// to the same value: 60 rather than 60.0.
pub fn fmt_num(x: f64) -> String {
    format!("{}", x)
}

pub fn write_output(output: &AnalysisOutput, target: &OutputTarget) -> AnalysisResult<()> {
    match target {
        OutputTarget::Stdout => {
            for table in output.tables.iter() {
                println!("# {}", table.name);
                print!("{}", table.to_csv_string()?);
            }
            if let Some((name, js)) = &output.summary {
                println!("# {}", name);
                println!("{}", pretty(name, js)?);
            }
        }
        OutputTarget::Directory(dir) => {
            fs::create_dir_all(dir).context(WritingFileSnafu {
                path: dir.display().to_string(),
            })?;
            for table in output.tables.iter() {
                let p = dir.join(table.name.as_str());
                info!("Writing {}", p.display());
                fs::write(&p, table.to_csv_string()?).context(WritingFileSnafu {
                    path: p.display().to_string(),
                })?;
            }
            if let Some((name, js)) = &output.summary {
                let pretty_js = pretty(name, js)?;
                println!("{}", pretty_js);
                let p = dir.join(name.as_str());
                info!("Writing {}", p.display());
                fs::write(&p, pretty_js).context(WritingFileSnafu {
                    path: p.display().to_string(),
                })?;
            }
        }
    }
    Ok(())
}

fn pretty(name: &str, js: &JSValue) -> AnalysisResult<String> {
    serde_json::to_string_pretty(js).context(WritingJsonSnafu { name })
}
