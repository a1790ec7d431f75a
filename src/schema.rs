use serde::Deserialize;
use std::fmt;

pub const FEATURE_COUNT: usize = 11;

// Training-order field names with inclusive bounds. The order is the contract
// the scaler and classifier were fitted on; reordering silently corrupts
// predictions, so it lives in exactly one place.
pub const FIELD_RANGES: [(&str, f64, f64); FEATURE_COUNT] = [
    ("N", 0.0, 200.0),
    ("P", 0.0, 150.0),
    ("K", 0.0, 250.0),
    ("ph", 3.0, 10.0),
    ("temperature", 0.0, 50.0),
    ("humidity", 0.0, 100.0),
    ("rainfall", 0.0, 3000.0),
    ("altitude_m", 0.0, 4500.0),
    ("Zn", 0.0, 50.0),
    ("S", 0.0, 100.0),
    ("soil_moisture", 0.0, 1.0),
];

/// A field as it arrived on the wire: a number, or anything else the caller
/// sent in its place. The untagged fallback keeps serde from failing fast on
/// the first wrong-type field, so the validator can report them all together.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Malformed(serde_json::Value),
}

impl From<f64> for RawField {
    fn from(v: f64) -> Self {
        RawField::Number(v)
    }
}

// FLAT request: every feature is a top-level key. Fields are Option at the
// serde layer so the validator can report all missing ones together instead
// of failing on the first.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CropInput {
    #[serde(rename = "N")]
    pub n: Option<RawField>,
    #[serde(rename = "P")]
    pub p: Option<RawField>,
    #[serde(rename = "K")]
    pub k: Option<RawField>,
    pub ph: Option<RawField>,
    pub temperature: Option<RawField>,
    pub humidity: Option<RawField>,
    pub rainfall: Option<RawField>,
    pub altitude_m: Option<RawField>,
    #[serde(rename = "Zn")]
    pub zn: Option<RawField>,
    #[serde(rename = "S")]
    pub s: Option<RawField>,
    pub soil_moisture: Option<RawField>,
}

/// One rejected field: its JSON path and the specific reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Multi-line aggregate message, one violation per line.
pub fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The validated, fixed-order input to the scaler and classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl CropInput {
    // Values in training order; must line up 1:1 with FIELD_RANGES.
    fn ordered(&self) -> [Option<&RawField>; FEATURE_COUNT] {
        [
            self.n.as_ref(),
            self.p.as_ref(),
            self.k.as_ref(),
            self.ph.as_ref(),
            self.temperature.as_ref(),
            self.humidity.as_ref(),
            self.rainfall.as_ref(),
            self.altitude_m.as_ref(),
            self.zn.as_ref(),
            self.s.as_ref(),
            self.soil_moisture.as_ref(),
        ]
    }

    /// Batch validation: every missing, wrong-type, non-finite, or
    /// out-of-range field is collected before returning, so the caller sees
    /// all violations at once.
    pub fn validate(&self) -> Result<FeatureVector, Vec<FieldViolation>> {
        let mut values = [0.0f64; FEATURE_COUNT];
        let mut violations = Vec::new();

        for (i, (maybe, &(name, min, max))) in
            self.ordered().iter().zip(FIELD_RANGES.iter()).enumerate()
        {
            match maybe {
                None => violations.push(FieldViolation {
                    field: name,
                    reason: "field required".to_string(),
                }),
                Some(RawField::Malformed(v)) => violations.push(FieldViolation {
                    field: name,
                    reason: format!("must be a number (got {})", v),
                }),
                Some(RawField::Number(v)) if !v.is_finite() => violations.push(FieldViolation {
                    field: name,
                    reason: "must be a finite number".to_string(),
                }),
                Some(RawField::Number(v)) if *v < min || *v > max => {
                    violations.push(FieldViolation {
                        field: name,
                        reason: format!("must be between {} and {} (got {})", min, max, v),
                    })
                }
                Some(RawField::Number(v)) => values[i] = *v,
            }
        }

        if violations.is_empty() {
            Ok(FeatureVector(values))
        } else {
            Err(violations)
        }
    }
}
