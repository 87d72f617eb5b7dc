//! Schedule request input: field merging, trimming, and gating validation.
//!
//! Three fields gate a generate attempt: property type, installation
//! description, and postcode. Everything else is optional and passes through
//! to the remote service unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::GenerateError;

/// Requested fidelity for generated schedules.
///
/// The advisor always pins outgoing requests to `Detailed`; `Standard`
/// remains selectable in config for callers that drive the backend directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Standard,
    #[default]
    Detailed,
}

/// One installation to generate a maintenance schedule for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// Installation category (e.g. domestic, commercial, industrial).
    pub property_type: String,

    /// Free-text description of the installation.
    pub installation_description: String,

    /// Site postcode.
    pub postcode: String,

    /// Age of the installation in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_age_years: Option<u32>,

    /// Date of the last periodic inspection, free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_inspection: Option<String>,

    /// Known issues or previous faults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_issues: Option<String>,

    /// Nominal fidelity selection. Ignored when building the request body,
    /// which always pins the highest setting.
    pub detail_level: DetailLevel,
}

/// Partial update applied to a [`ScheduleRequest`] by shallow key overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestPatch {
    pub property_type: Option<String>,
    pub installation_description: Option<String>,
    pub postcode: Option<String>,
    pub installation_age_years: Option<u32>,
    pub last_inspection: Option<String>,
    pub known_issues: Option<String>,
    pub detail_level: Option<DetailLevel>,
}

/// A request whose required fields were verified non-empty and trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub property_type: String,
    pub installation_description: String,
    pub postcode: String,
    pub installation_age_years: Option<u32>,
    pub last_inspection: Option<String>,
    pub known_issues: Option<String>,
}

impl ScheduleRequest {
    /// Merge a partial update, overwriting only the fields it sets.
    pub fn merge(&mut self, patch: RequestPatch) {
        if let Some(value) = patch.property_type {
            self.property_type = value;
        }
        if let Some(value) = patch.installation_description {
            self.installation_description = value;
        }
        if let Some(value) = patch.postcode {
            self.postcode = value;
        }
        if let Some(value) = patch.installation_age_years {
            self.installation_age_years = Some(value);
        }
        if let Some(value) = patch.last_inspection {
            self.last_inspection = Some(value);
        }
        if let Some(value) = patch.known_issues {
            self.known_issues = Some(value);
        }
        if let Some(value) = patch.detail_level {
            self.detail_level = value;
        }
    }

    /// Trim the required fields and fail if any is empty.
    ///
    /// The gate is non-empty-after-trim only; a postcode that does not look
    /// like a UK postcode is logged but never rejected here.
    pub fn validated(&self) -> Result<ValidatedRequest, GenerateError> {
        let property_type = self.property_type.trim();
        let installation_description = self.installation_description.trim();
        let postcode = self.postcode.trim();

        let mut missing = Vec::new();
        if property_type.is_empty() {
            missing.push("property type");
        }
        if installation_description.is_empty() {
            missing.push("installation description");
        }
        if postcode.is_empty() {
            missing.push("postcode");
        }
        if !missing.is_empty() {
            return Err(GenerateError::Validation { missing });
        }

        if !looks_like_uk_postcode(postcode) {
            warn!(postcode, "postcode does not look like a UK postcode");
        }

        Ok(ValidatedRequest {
            property_type: property_type.to_string(),
            installation_description: installation_description.to_string(),
            postcode: postcode.to_string(),
            installation_age_years: self.installation_age_years,
            last_inspection: self.last_inspection.clone(),
            known_issues: self.known_issues.clone(),
        })
    }
}

impl ValidatedRequest {
    /// Build the remote request body. Unset optional fields are omitted and
    /// `detailLevel` is pinned to the highest setting.
    pub fn into_body(self) -> Value {
        let mut body = json!({
            "propertyType": self.property_type,
            "installationDescription": self.installation_description,
            "postcode": self.postcode,
            "detailLevel": DetailLevel::Detailed,
        });
        let map = body
            .as_object_mut()
            .expect("request body is always an object");
        if let Some(age) = self.installation_age_years {
            map.insert("installationAgeYears".to_string(), json!(age));
        }
        if let Some(last_inspection) = self.last_inspection {
            map.insert("lastInspection".to_string(), json!(last_inspection));
        }
        if let Some(known_issues) = self.known_issues {
            map.insert("knownIssues".to_string(), json!(known_issues));
        }
        body
    }
}

fn looks_like_uk_postcode(postcode: &str) -> bool {
    let pattern = regex::Regex::new(r"(?i)^[A-Z]{1,2}[0-9][0-9A-Z]?\s*[0-9][A-Z]{2}$")
        .expect("postcode pattern is valid");
    pattern.is_match(postcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ScheduleRequest {
        ScheduleRequest {
            property_type: "domestic".to_string(),
            installation_description: "1970s consumer unit, partial rewire 2015".to_string(),
            postcode: "SW1A 1AA".to_string(),
            ..ScheduleRequest::default()
        }
    }

    #[test]
    fn merge_overwrites_only_set_fields() {
        let mut request = valid_request();
        request.merge(RequestPatch {
            postcode: Some("M1 1AE".to_string()),
            known_issues: Some("RCD trips intermittently".to_string()),
            ..RequestPatch::default()
        });
        assert_eq!(request.postcode, "M1 1AE");
        assert_eq!(request.known_issues.as_deref(), Some("RCD trips intermittently"));
        assert_eq!(request.property_type, "domestic");
    }

    #[test]
    fn whitespace_only_required_field_is_reported_missing() {
        let mut request = valid_request();
        request.installation_description = "   \t".to_string();
        let err = request.validated().expect_err("whitespace must not pass");
        match err {
            GenerateError::Validation { missing } => {
                assert_eq!(missing, vec!["installation description"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn all_missing_fields_are_listed_in_declaration_order() {
        let request = ScheduleRequest::default();
        let err = request.validated().expect_err("empty request must fail");
        match err {
            GenerateError::Validation { missing } => {
                assert_eq!(
                    missing,
                    vec!["property type", "installation description", "postcode"]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn odd_postcode_is_warned_but_not_rejected() {
        let mut request = valid_request();
        request.postcode = "not-a-postcode".to_string();
        assert!(request.validated().is_ok());
    }

    #[test]
    fn body_trims_fields_and_pins_detail_level() {
        let mut request = valid_request();
        request.postcode = "  SW1A 1AA  ".to_string();
        request.detail_level = DetailLevel::Standard;
        request.installation_age_years = Some(42);
        let body = request.validated().expect("valid").into_body();
        assert_eq!(body["postcode"], "SW1A 1AA");
        assert_eq!(body["detailLevel"], "detailed");
        assert_eq!(body["installationAgeYears"], 42);
        assert!(body.get("knownIssues").is_none());
    }

    #[test]
    fn uk_postcode_shapes_are_recognized() {
        for postcode in ["SW1A 1AA", "m1 1ae", "B33 8TH", "CR26XH"] {
            assert!(looks_like_uk_postcode(postcode), "{postcode}");
        }
        assert!(!looks_like_uk_postcode("12345"));
    }
}
