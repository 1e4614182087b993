//! Building bodies from raw catalog records (field name → string value).

use std::collections::{BTreeMap, HashMap};

use ksp_core::units::{deg_to_rad, m_to_km};
use thiserror::Error;

use crate::body::{Body, OrbitError, OrbitalElements};

/// Column headers of the celestial catalog.
pub mod headers {
    pub const NAME: &str = "Celestial Body (Reference code)";
    pub const PARENT: &str = "Parent Body Reference Code";
    pub const SEMI_MAJOR_AXIS: &str = "Semimajor_axis";
    pub const PERIOD: &str = "Sidereal_period";
    pub const MEAN_ANOMALY: &str = "Mean_anomaly";
    pub const ECCENTRICITY: &str = "Orbital_eccentricity";
    pub const ASCENDING_NODE: &str = "Longitude_of_the_ascending_node";
    pub const ARGUMENT_OF_PERIAPSIS: &str = "Argument_of_periapsis";

    /// Every column a record must provide.
    pub const REQUIRED: [&str; 8] = [
        NAME,
        PARENT,
        SEMI_MAJOR_AXIS,
        PERIOD,
        MEAN_ANOMALY,
        ECCENTRICITY,
        ASCENDING_NODE,
        ARGUMENT_OF_PERIAPSIS,
    ];
}

/// Malformed catalog record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}': expected 'Name (code)', got '{value}'")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("field '{field}': '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid orbit: {0}")]
    Domain(#[from] OrbitError),
}

/// Anything that can look up a raw field by column name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for HashMap<&str, &str> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).copied()
    }
}

impl FieldSource for BTreeMap<&str, &str> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).copied()
    }
}

impl Body {
    /// Build a body from a catalog record.
    ///
    /// Semi-major axis arrives in metres and angles other than the mean anomaly in
    /// degrees; both are converted. Thousands separators are accepted in numbers.
    pub fn from_record<R: FieldSource + ?Sized>(record: &R) -> Result<Self, RecordError> {
        let (name, code) = parse_identifier(required(record, headers::NAME)?)?;
        let parent_code = parse_code(record, headers::PARENT)?;

        let elements = OrbitalElements {
            semi_major_axis_km: m_to_km(parse_number(record, headers::SEMI_MAJOR_AXIS)?),
            sidereal_period_s: parse_number(record, headers::PERIOD)?,
            mean_anomaly_epoch: parse_number(record, headers::MEAN_ANOMALY)?,
            eccentricity: parse_number(record, headers::ECCENTRICITY)?,
            ascending_node_longitude: deg_to_rad(parse_number(record, headers::ASCENDING_NODE)?),
            argument_of_periapsis: deg_to_rad(parse_number(
                record,
                headers::ARGUMENT_OF_PERIAPSIS,
            )?),
        };

        Ok(Body::new(name, code, parent_code, elements)?)
    }
}

fn required<'a, R: FieldSource + ?Sized>(
    record: &'a R,
    field: &'static str,
) -> Result<&'a str, RecordError> {
    match record.field(field).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RecordError::MissingField { field }),
    }
}

fn parse_number<R: FieldSource + ?Sized>(
    record: &R,
    field: &'static str,
) -> Result<f64, RecordError> {
    let raw = required(record, field)?;
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RecordError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_code<R: FieldSource + ?Sized>(
    record: &R,
    field: &'static str,
) -> Result<u32, RecordError> {
    let raw = required(record, field)?;
    raw.parse().map_err(|_| RecordError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Split `"Kerbin (1)"` into its name and numeric code.
fn parse_identifier(raw: &str) -> Result<(String, u32), RecordError> {
    let invalid = || RecordError::InvalidIdentifier {
        field: headers::NAME,
        value: raw.to_string(),
    };

    let open = raw.rfind('(').ok_or_else(invalid)?;
    let close = raw[open..].find(')').map(|i| open + i).ok_or_else(invalid)?;
    let code = raw[open + 1..close].trim().parse::<u32>().map_err(|_| invalid())?;
    let name = raw[..open].trim();
    if name.is_empty() {
        return Err(invalid());
    }
    Ok((name.to_string(), code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kerbin_record() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            (headers::NAME, "Kerbin (1)"),
            (headers::PARENT, "0"),
            (headers::SEMI_MAJOR_AXIS, "13,599,840,256"),
            (headers::PERIOD, "9,203,545"),
            (headers::MEAN_ANOMALY, "3.14"),
            (headers::ECCENTRICITY, "0"),
            (headers::ASCENDING_NODE, "0"),
            (headers::ARGUMENT_OF_PERIAPSIS, "0"),
        ])
    }

    #[test]
    fn parses_and_converts_units() {
        let mut record = kerbin_record();
        record.insert(headers::ASCENDING_NODE, "90");
        let body = Body::from_record(&record).unwrap();

        assert_eq!(body.name(), "Kerbin");
        assert_eq!(body.code(), 1);
        assert_eq!(body.parent_code(), 0);
        assert!((body.semi_major_axis_km() - 13_599_840.256).abs() < 1e-6);
        assert_eq!(body.period_s(), 9_203_545.0);
        assert!((body.elements().ascending_node_longitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(body.elements().mean_anomaly_epoch, 3.14);
    }

    #[test]
    fn accepts_owned_string_maps() {
        let record: HashMap<String, String> = kerbin_record()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(Body::from_record(&record).unwrap().code(), 1);
    }

    #[test]
    fn identifier_allows_multi_word_names() {
        assert_eq!(
            parse_identifier("The Mun (2)").unwrap(),
            ("The Mun".to_string(), 2)
        );
        for bad in ["Kerbin", "Kerbin (x)", "(4)", "Kerbin (1"] {
            assert!(
                matches!(parse_identifier(bad), Err(RecordError::InvalidIdentifier { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn errors_name_the_offending_field() {
        let mut record = kerbin_record();
        record.remove(headers::PERIOD);
        assert_eq!(
            Body::from_record(&record),
            Err(RecordError::MissingField { field: headers::PERIOD })
        );

        let mut record = kerbin_record();
        record.insert(headers::ECCENTRICITY, "zero");
        let err = Body::from_record(&record).unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidNumber {
                field: headers::ECCENTRICITY,
                value: "zero".to_string()
            }
        );
        assert!(err.to_string().contains("Orbital_eccentricity"));

        let mut record = kerbin_record();
        record.insert(headers::PARENT, "-1");
        assert!(matches!(
            Body::from_record(&record),
            Err(RecordError::InvalidNumber { field: headers::PARENT, .. })
        ));
    }

    #[test]
    fn domain_violations_surface_as_domain_errors() {
        let mut record = kerbin_record();
        record.insert(headers::ECCENTRICITY, "1.2");
        assert_eq!(
            Body::from_record(&record),
            Err(RecordError::Domain(OrbitError::InvalidEccentricity(1.2)))
        );
    }
}
