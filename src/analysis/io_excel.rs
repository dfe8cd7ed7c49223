use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::analysis::io_common::simplify_file_name;
use crate::analysis::*;

/// Reads a worksheet whose first row holds the column names.
pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> AnalysisResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu { path })?;
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| read_cell(path, 1, idx, cell))
        .collect::<AnalysisResult<Vec<String>>>()?;
    debug!("read_excel_table: {}: headers {:?}", path, headers);

    let mut table = Table::new(simplify_file_name(path).as_str(), &headers);
    for (ridx, row) in rows.enumerate() {
        // The header is on line 1.
        let lineno = ridx + 2;
        let cells = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| read_cell(path, lineno, idx, cell))
            .collect::<AnalysisResult<Vec<String>>>()?;
        table.push_row(cells);
    }
    Ok(table)
}

fn read_cell(path: &str, lineno: usize, col: usize, cell: &DataType) -> AnalysisResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        // Counts come out of Excel as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno: lineno as u64,
            content: format!("column {}: {:?}", col + 1, cell),
        }
        .fail(),
    }
}
