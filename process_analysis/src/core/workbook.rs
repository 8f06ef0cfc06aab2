//! Excel workbooks (`.xlsx`, `.xls`)
//!
//! The first worksheet is read as a table whose first row holds the column
//! names. Cell values are rendered as text: numbers without a trailing `.0`,
//! dates as `YYYY-MM-DD HH:MM:SS`.

use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};

use super::dataset::{cell_value, Dataset};
use crate::error::{AnalysisError, Result};

/// Read the first worksheet of an `.xlsx` workbook.
pub fn read_xlsx<R: Read>(reader: R) -> Result<Dataset> {
    read_first_sheet::<Xlsx<_>, _>(buffer(reader)?)
}

/// Read the first worksheet of a legacy `.xls` workbook.
pub fn read_xls<R: Read>(reader: R) -> Result<Dataset> {
    read_first_sheet::<Xls<_>, _>(buffer(reader)?)
}

// Workbook readers need to seek
fn buffer<R: Read>(mut reader: R) -> Result<Cursor<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(Cursor::new(bytes))
}

fn unparseable(e: impl Display) -> AnalysisError {
    AnalysisError::UnparseableDataset(e.to_string())
}

fn read_first_sheet<W, RS>(reader: RS) -> Result<Dataset>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: Display,
{
    let mut workbook: W = open_workbook_from_rs(reader).map_err(unparseable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unparseable("the workbook has no worksheet"))?
        .map_err(unparseable)?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| unparseable("the header row is missing"))?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("Unnamed: {i}")))
        .collect();
    let rows: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    tracing::debug!(columns = columns.len(), rows = rows.len(), "Read worksheet");
    Ok(Dataset::new(columns, rows))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => cell_value(s),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map_or_else(|| cell.to_string(), |d| d.format("%F %T").to_string()),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::{Format, Workbook};

    use super::*;

    fn workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let stamp = Format::new().set_num_format("yyyy-mm-dd hh:mm");
        {
            let sheet = workbook.add_worksheet();
            sheet.write_string(0, 0, "case").unwrap();
            sheet.write_string(0, 1, "activity").unwrap();
            sheet.write_string(0, 2, "time").unwrap();
            sheet.write_string(0, 3, "cost").unwrap();

            sheet.write_number(1, 0, 7).unwrap();
            sheet.write_string(1, 1, "Register").unwrap();
            sheet.write_number_with_format(1, 2, 45292.4375, &stamp).unwrap();
            sheet.write_number(1, 3, 12.5).unwrap();

            sheet.write_number(2, 0, 7).unwrap();
            sheet.write_string(2, 1, "NA").unwrap();
            sheet.write_string(2, 2, "2024-01-01 11:00").unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_xlsx() {
        let dataset = read_xlsx(workbook().as_slice()).unwrap();
        assert_eq!(dataset.columns(), ["case", "activity", "time", "cost"]);
        assert_eq!(dataset.len(), 2);

        let first = &dataset.rows()[0];
        assert_eq!(first[0].as_deref(), Some("7"));
        assert_eq!(first[2].as_deref(), Some("2024-01-01 10:30:00"));
        assert_eq!(first[3].as_deref(), Some("12.5"));

        let second = &dataset.rows()[1];
        assert_eq!(second[1], None);
        assert_eq!(second[2].as_deref(), Some("2024-01-01 11:00"));
        assert_eq!(second[3], None);
    }

    #[test]
    fn test_not_a_workbook() {
        let err = read_xlsx("case,activity\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnparseableDataset(_)));
    }
}
