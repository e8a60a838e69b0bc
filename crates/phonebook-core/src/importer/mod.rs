//! Roster importer
//!
//! Turns CSV bytes into an ordered list of [`Entry`] values.
//!
//! - Header names are matched case-insensitively.
//! - `first_name`, `name`, `callsign` and `telephone` are required.
//! - Rows with `privat` set to `y` are dropped.
//! - The first row whose four core fields are all blank ends the data;
//!   anything after it is ignored.
//! - Any malformed row fails the whole import. Line breaks inside a field
//!   are treated as malformed: a quote that is never closed swallows the
//!   rest of the input into one field.

use crate::entry::Entry;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

pub const HEADER_FIRST_NAME: &str = "first_name";
pub const HEADER_LAST_NAME: &str = "name";
pub const HEADER_CALLSIGN: &str = "callsign";
pub const HEADER_PHONE_NUMBER: &str = "telephone";
pub const HEADER_PRIVATE: &str = "privat";
pub const HEADER_ADDRESS: &[&str] = &["address", "ip_address"];

/// Column positions resolved from the header row
struct Columns {
    first_name: usize,
    last_name: usize,
    callsign: usize,
    phone_number: usize,
    private: Option<usize>,
    address: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();

        let required = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| Error::import(format!("missing column: {}", name)))
        };

        Ok(Self {
            first_name: required(HEADER_FIRST_NAME)?,
            last_name: required(HEADER_LAST_NAME)?,
            callsign: required(HEADER_CALLSIGN)?,
            phone_number: required(HEADER_PHONE_NUMBER)?,
            private: index.get(HEADER_PRIVATE).copied(),
            address: HEADER_ADDRESS.iter().find_map(|h| index.get(*h).copied()),
        })
    }
}

fn field(row: &csv::StringRecord, idx: usize) -> &str {
    row.get(idx).map(str::trim).unwrap_or("")
}

/// Parse a roster into entries, preserving row order
pub fn import(raw: &[u8]) -> Result<Vec<Entry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(raw);

    let headers = reader
        .headers()
        .map_err(|e| Error::import(format!("unable to read header row: {}", e)))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| Error::import(format!("row {}: {}", idx + 1, e)))?;
        if row.iter().any(|f| f.contains(['\n', '\r'])) {
            return Err(Error::import(format!(
                "row {}: line break inside a field (unterminated quote?)",
                idx + 1
            )));
        }

        let first_name = field(&row, columns.first_name);
        let last_name = field(&row, columns.last_name);
        let callsign = field(&row, columns.callsign);
        let phone_number = field(&row, columns.phone_number);

        if first_name.is_empty() && last_name.is_empty() && callsign.is_empty() && phone_number.is_empty() {
            debug!("Blank row {} terminates the roster", idx + 1);
            break;
        }

        if let Some(private) = columns.private
            && field(&row, private).eq_ignore_ascii_case("y")
        {
            skipped += 1;
            continue;
        }

        let address = columns.address.map(|i| field(&row, i)).unwrap_or("");
        entries.push(Entry::new(first_name, last_name, callsign, phone_number).with_address(address));
    }

    debug!("Imported {} entries ({} private skipped)", entries.len(), skipped);
    Ok(entries)
}
