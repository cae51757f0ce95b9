use std::io;

use hashbrown::HashMap;

use aquaconn_core::site::SiteId;

use crate::error::{InputError, Result};

/// A square site-by-site table as written in CSV: the first header cell is a free label,
/// the remaining header cells are site ids, and every row starts with its site id.
#[derive(Clone, Debug)]
pub struct SquareTable {
    pub label: String,
    pub site_ids: Vec<SiteId>,
    /// Row-major values, rows in the same order as the header columns.
    pub values: Vec<f64>,
}

fn parse_site_id(value: &str, context: &str) -> Result<SiteId> {
    value.parse::<SiteId>().map_err(|_| InputError::InvalidSiteId {
        value: value.to_string(),
        context: context.to_string(),
    })
}

fn parse_value(value: &str, row: usize) -> Result<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|_| InputError::InvalidNumber {
        value: value.to_string(),
        row,
    })
}

/// Reads a square table. Rows may come in any order; they are rearranged to follow the
/// header. Empty cells are read as NaN.
pub fn read_square_table<R: io::Read>(reader: R) -> Result<SquareTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut header_cells = headers.iter();
    let label = header_cells
        .next()
        .ok_or(InputError::EmptyHeader)?
        .to_string();
    let site_ids = header_cells
        .map(|cell| parse_site_id(cell, "table header"))
        .collect::<Result<Vec<SiteId>>>()?;
    let size = site_ids.len();

    let columns: HashMap<SiteId, usize> = site_ids
        .iter()
        .enumerate()
        .map(|(idx, site_id)| (*site_id, idx))
        .collect();
    let mut rows: Vec<Option<Vec<f64>>> = vec![None; size];

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() != size + 1 {
            return Err(InputError::RowLength {
                row,
                expected: size + 1,
                actual: record.len(),
            });
        }
        let site_id = parse_site_id(&record[0], "first column")?;
        let slot = *columns
            .get(&site_id)
            .ok_or(InputError::UnexpectedRow(site_id))?;
        let values = record
            .iter()
            .skip(1)
            .map(|value| parse_value(value, row))
            .collect::<Result<Vec<f64>>>()?;
        if rows[slot].is_some() {
            return Err(InputError::DuplicateRow(site_id));
        }
        rows[slot] = Some(values);
    }

    let mut values = Vec::with_capacity(size * size);
    for (slot, row) in rows.into_iter().enumerate() {
        match row {
            Some(row) => values.extend(row),
            None => return Err(InputError::MissingRow(site_ids[slot])),
        }
    }
    Ok(SquareTable {
        label,
        site_ids,
        values,
    })
}
