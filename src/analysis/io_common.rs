use crate::analysis::*;

use crate::analysis::io_csv::read_csv_table;
use crate::analysis::io_excel::read_excel_table;

/// Relative paths in the configuration are relative to the configuration
/// file.
pub fn resolve_path(root: &Path, file_path: &str) -> PathBuf {
    let p = Path::new(file_path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// The last component of a path, used to name the tables in the messages.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn read_table(root: &Path, source: &FileSource) -> AnalysisResult<Table> {
    let path = resolve_path(root, source.file_path.as_str())
        .display()
        .to_string();
    info!("Reading {} ({})", path, source.provider());
    let table = match source.provider() {
        "csv" => read_csv_table(path.as_str())?,
        "xlsx" => read_excel_table(path.as_str(), source.excel_worksheet_name.as_deref())?,
        x => {
            return UnknownProviderSnafu {
                provider: x.to_string(),
                path,
            }
            .fail()
        }
    };
    debug!(
        "read_table: {}: {} rows, headers {:?}",
        table.source(),
        table.len(),
        table.headers()
    );
    Ok(table)
}
