//! The zone reader: parses the administrator's CSV mapping of CIDR
//! networks to PAC filenames.

use std::path::Path;

use crate::error::ZoneReadError;
use crate::ip::IpNet;
use crate::pathnorm::normalize_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub network: IpNet,
    pub pac_filename: String,
    pub comment: Option<String>,
}

/// Reads and parses a zone file, returning the accepted records and a
/// count of per-line problems that were logged and skipped.
///
/// A missing or unreadable file is a hard failure: an empty list is
/// returned alongside the error, and the caller should count that as
/// one minor problem on top of whatever this function returns.
pub async fn read_zone_file(path: &Path) -> Result<(Vec<ZoneRecord>, usize), ZoneReadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ZoneReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    let mut problems = 0usize;

    for (line_no, line) in contents.lines().enumerate() {
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!(line = line_no + 1, %reason, "skipping malformed zone line");
                problems += 1;
            }
        }
    }

    Ok((records, problems))
}

fn parse_line(line: &str) -> Result<ZoneRecord, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());

    let mut fields: Vec<String> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| format!("invalid csv: {e}"))?;
        for field in record.iter() {
            fields.push(field.trim().to_string());
        }
    }

    if fields.len() != 3 && fields.len() != 4 {
        return Err(format!(
            "expected 3 or 4 fields, got {} ({:?})",
            fields.len(),
            fields
        ));
    }

    let prefix_len: i64 = fields[1]
        .parse()
        .map_err(|_| format!("invalid prefix length {:?}", fields[1]))?;
    let network = IpNet::from_parts(&fields[0], prefix_len).map_err(|e| e.to_string())?;
    let pac_filename = normalize_path(&fields[2]);
    let comment = fields.get(3).cloned();

    Ok(ZoneRecord {
        network,
        pac_filename,
        comment,
    })
}
