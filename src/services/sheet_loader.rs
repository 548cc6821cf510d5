use std::path::Path;
use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info};
use crate::errors::CatalogError;
use crate::services::catalog::{Catalog, WordRecord};
use crate::utils::cell_to_text;

const COLUMNS: [&str; 6] = ["grade", "semester", "model", "unit", "category", "English"];

/// Load the vocabulary workbook into a catalog.
/// Uses `sheet` when given, otherwise the first worksheet.
pub fn load_catalog(file_path: &str, sheet: Option<&str>) -> Result<Catalog, CatalogError> {
    let unavailable = |reason: String| CatalogError::DataUnavailable {
        path: file_path.to_string(),
        reason,
    };

    if !Path::new(file_path).is_file() {
        return Err(unavailable("file not found".to_string()));
    }

    let mut workbook = open_workbook_auto(file_path).map_err(|e| unavailable(e.to_string()))?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|e| unavailable(e.to_string()))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| unavailable("workbook has no worksheets".to_string()))?
            .map_err(|e| unavailable(e.to_string()))?,
    };

    let records = records_from_range(&range)?;
    info!("Loaded {} word rows from {}.", records.len(), file_path);
    Ok(Catalog::new(records))
}

/// Turn a worksheet into records; the first row is the header
pub fn records_from_range(range: &Range<Data>) -> Result<Vec<WordRecord>, CatalogError> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or(CatalogError::EmptySheet)?
        .iter()
        .map(cell_to_text)
        .collect();

    let mut index = [0usize; 6];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .ok_or(CatalogError::MissingColumn(name))?;
    }

    let mut records = Vec::new();
    for (n, row) in rows.enumerate() {
        let cell = |i: usize| row.get(index[i]).map(cell_to_text).unwrap_or_default();
        let english = cell(5);
        if english.is_empty() {
            debug!("Skipping row {} with no English text", n + 2);
            continue;
        }
        records.push(WordRecord {
            grade: cell(0),
            semester: cell(1),
            model: cell(2),
            unit: cell(3),
            category: cell(4),
            english,
        });
    }

    Ok(records)
}
