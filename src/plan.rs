//! Generated maintenance plan types.
//!
//! These mirror the remote service's wire shape (camelCase field names).
//! Unknown fields inside a schedule entry are kept rather than dropped so
//! downstream consumers can render whatever the service adds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated schedule payload produced by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaintenancePlan {
    /// Ordered maintenance tasks. Non-empty in any plan that passed
    /// validation.
    pub schedule: Vec<ScheduleItem>,

    /// Set when the service could only produce a subset of the expected
    /// sections.
    pub partial: bool,

    /// Names of the sections the service could not produce.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_sections: Vec<String>,

    /// Regulation references backing the schedule (e.g. BS 7671 chapters).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,

    /// Indicative costs for the scheduled work.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cost_estimates: Vec<CostEstimate>,

    /// Free-text safety advice.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_notes: Vec<String>,
}

/// One scheduled maintenance task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleItem {
    pub task: String,

    /// Recommended recurrence, free-form (e.g. "every 5 years").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Fields this client does not model yet.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A regulation or guidance reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Citation {
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Indicative cost for one piece of scheduled work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostEstimate {
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}
