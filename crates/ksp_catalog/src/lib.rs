//! Celestial catalog: loads CSV body records into an immutable lookup by catalog code.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use ksp_orbits::{Body, RecordError, headers};
use thiserror::Error;
use tracing::{info, warn};

/// What to do with rows that fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Abort the load on the first bad row.
    Strict,
    /// Log the row, remember it in the report, and carry on.
    #[default]
    SkipInvalid,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("catalog line {line}: {source}")]
    Malformed {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("catalog line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: RecordError,
    },
    #[error("catalog line {line}: code {code} already used by {existing}")]
    DuplicateCode {
        line: u64,
        code: u32,
        existing: String,
    },
    #[error("body '{0}' not found in catalog")]
    NotFound(String),
}

/// A row that was skipped during a lenient load.
#[derive(Debug)]
pub struct RejectedRow {
    pub line: u64,
    pub error: CatalogError,
}

/// Outcome of a catalog load.
#[derive(Debug)]
pub struct LoadReport {
    pub catalog: Catalog,
    pub rejected: Vec<RejectedRow>,
}

/// Immutable set of bodies keyed by catalog code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    bodies: BTreeMap<u32, Body>,
}

impl Catalog {
    /// Build a catalog from already-constructed bodies; codes must be unique.
    pub fn from_bodies(bodies: impl IntoIterator<Item = Body>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for (index, body) in bodies.into_iter().enumerate() {
            insert_unique(&mut map, body, index as u64 + 1)?;
        }
        Ok(Self { bodies: map })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn get(&self, code: u32) -> Option<&Body> {
        self.bodies.get(&code)
    }

    /// Case-insensitive lookup by exact name.
    pub fn by_name(&self, name: &str) -> Option<&Body> {
        let wanted = name.trim();
        self.bodies
            .values()
            .find(|body| body.name().eq_ignore_ascii_case(wanted))
    }

    /// Resolve a user query that is either a catalog code or a body name.
    pub fn find(&self, query: &str) -> Result<&Body, CatalogError> {
        let trimmed = query.trim();
        let by_code = trimmed.parse::<u32>().ok().and_then(|code| self.get(code));
        by_code
            .or_else(|| self.by_name(trimmed))
            .ok_or_else(|| CatalogError::NotFound(trimmed.to_string()))
    }

    /// Bodies orbiting the body with the given code.
    pub fn satellites_of(&self, code: u32) -> Vec<&Body> {
        self.bodies
            .values()
            .filter(|body| body.parent_code() == code)
            .collect()
    }
}

/// Load a CSV catalog from disk.
pub fn load_catalog<P: AsRef<Path>>(path: P, policy: LoadPolicy) -> Result<LoadReport, CatalogError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let report = read_catalog(file, policy)?;
    info!(
        path = %path.display(),
        bodies = report.catalog.len(),
        rejected = report.rejected.len(),
        "catalog loaded"
    );
    Ok(report)
}

/// Read a CSV catalog from any reader. The first row holds the column headers.
pub fn read_catalog<R: Read>(reader: R, policy: LoadPolicy) -> Result<LoadReport, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let header_row = csv_reader.headers()?;
    if let Some(missing) = headers::REQUIRED
        .iter()
        .find(|column| !header_row.iter().any(|field| field == **column))
    {
        return Err(CatalogError::MissingColumn(*missing));
    }

    let mut bodies = BTreeMap::new();
    let mut rejected = Vec::new();

    for (index, result) in csv_reader
        .deserialize::<BTreeMap<String, String>>()
        .enumerate()
    {
        // header is line 1
        let fallback_line = index as u64 + 2;

        let outcome = match result {
            Ok(record) => Body::from_record(&record)
                .map_err(|source| CatalogError::Record {
                    line: fallback_line,
                    source,
                })
                .and_then(|body| insert_unique(&mut bodies, body, fallback_line)),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err.position().map_or(fallback_line, |pos| pos.line());
                Err(CatalogError::Malformed { line, source: err })
            }
        };

        match (outcome, policy) {
            (Ok(()), _) => {}
            (Err(err), LoadPolicy::Strict) => return Err(err),
            (Err(err), LoadPolicy::SkipInvalid) => {
                let line = err.line().unwrap_or(fallback_line);
                warn!(line, error = %err, "skipping catalog row");
                rejected.push(RejectedRow { line, error: err });
            }
        }
    }

    Ok(LoadReport {
        catalog: Catalog { bodies },
        rejected,
    })
}

impl CatalogError {
    /// Catalog line the error refers to, when it concerns a single row.
    pub fn line(&self) -> Option<u64> {
        match self {
            CatalogError::Record { line, .. }
            | CatalogError::DuplicateCode { line, .. }
            | CatalogError::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }
}

fn insert_unique(
    map: &mut BTreeMap<u32, Body>,
    body: Body,
    line: u64,
) -> Result<(), CatalogError> {
    if let Some(existing) = map.get(&body.code()) {
        return Err(CatalogError::DuplicateCode {
            line,
            code: body.code(),
            existing: existing.name().to_string(),
        });
    }
    map.insert(body.code(), body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Celestial Body (Reference code),Parent Body Reference Code,Semimajor_axis,Sidereal_period,Mean_anomaly,Orbital_eccentricity,Longitude_of_the_ascending_node,Argument_of_periapsis";

    fn csv(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    const KERBIN: &str = "Kerbin (1),0,\"13,599,840,256\",\"9,203,545\",3.14,0,0,0";
    const MUN: &str = "Mun (2),1,\"12,000,000\",\"138,984\",1.7,0,0,0";
    const DUNA: &str = "Duna (6),0,\"20,726,155,264\",\"17,315,400\",3.14,0.051,135.5,0";

    #[test]
    fn reads_quoted_thousands_separators() {
        let report = read_catalog(csv(&[KERBIN, MUN, DUNA]).as_bytes(), LoadPolicy::Strict).unwrap();
        assert!(report.rejected.is_empty());
        let catalog = report.catalog;
        assert_eq!(catalog.len(), 3);
        assert!((catalog.get(6).unwrap().semi_major_axis_km() - 20_726_155.264).abs() < 1e-6);
        assert_eq!(catalog.satellites_of(1).len(), 1);
        assert_eq!(catalog.satellites_of(0).len(), 2);
    }

    #[test]
    fn lenient_load_skips_and_reports_bad_rows() {
        let bad = "Eve (5),0,lots,\"5,657,995\",3.14,0.01,15,0";
        let report =
            read_catalog(csv(&[KERBIN, bad, DUNA]).as_bytes(), LoadPolicy::SkipInvalid).unwrap();
        assert_eq!(report.catalog.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 3);
        assert!(report.rejected[0].error.to_string().contains("Semimajor_axis"));
    }

    #[test]
    fn strict_load_fails_on_first_bad_row() {
        let bad = "Nameless,0,\"1,000\",\"100\",0,0,0,0";
        let err = read_catalog(csv(&[KERBIN, bad]).as_bytes(), LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, CatalogError::Record { line: 3, .. }), "{err}");
    }

    #[test]
    fn lenient_load_survives_undecodable_rows() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(HEADER.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(KERBIN.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(b"Bad\xff (9),0,1,1,0,0,0,0\n");
        bytes.extend_from_slice(DUNA.as_bytes());

        let report = read_catalog(bytes.as_slice(), LoadPolicy::SkipInvalid).unwrap();
        assert_eq!(report.catalog.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 3);
        assert!(matches!(report.rejected[0].error, CatalogError::Malformed { .. }));

        let err = read_catalog(bytes.as_slice(), LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 3, .. }), "{err}");
    }

    #[test]
    fn missing_columns_fail_every_policy() {
        let text = "Celestial Body (Reference code),Semimajor_axis\nKerbin (1),1";
        for policy in [LoadPolicy::Strict, LoadPolicy::SkipInvalid] {
            let err = read_catalog(text.as_bytes(), policy).unwrap_err();
            assert!(
                matches!(err, CatalogError::MissingColumn(headers::PARENT)),
                "{err}"
            );
        }
    }

    #[test]
    fn from_bodies_matches_csv_load_and_rejects_duplicates() {
        let loaded = read_catalog(csv(&[KERBIN, MUN, DUNA]).as_bytes(), LoadPolicy::Strict)
            .unwrap()
            .catalog;
        let rebuilt = Catalog::from_bodies(loaded.iter().cloned()).unwrap();
        assert_eq!(rebuilt, loaded);

        let kerbin = loaded.get(1).unwrap().clone();
        let err = Catalog::from_bodies([kerbin.clone(), kerbin]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateCode { line: 2, code: 1, .. }
        ));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = read_catalog(csv(&[KERBIN, KERBIN]).as_bytes(), LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode { code: 1, .. }));
    }

    #[test]
    fn find_accepts_names_and_codes() {
        let catalog = read_catalog(csv(&[KERBIN, DUNA]).as_bytes(), LoadPolicy::Strict)
            .unwrap()
            .catalog;
        assert_eq!(catalog.find("duna").unwrap().code(), 6);
        assert_eq!(catalog.find(" 1 ").unwrap().name(), "Kerbin");
        assert!(matches!(catalog.find("Jool"), Err(CatalogError::NotFound(_))));
    }
}
