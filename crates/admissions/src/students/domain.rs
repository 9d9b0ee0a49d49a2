use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{CourseId, NodeRef, ProgramId, SubProgramId};
use crate::fields::FieldId;
use crate::forms::CanonicalAttribute;
use crate::intake::IntakeError;

/// Identifier wrapper for an admission application, e.g. `ADM-000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an application record.
///
/// `Lead` is a public-form submission that has not been qualified; `Trashed`
/// is a restorable soft delete; `Purged` is terminal and only reachable from
/// `Trashed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Lead,
    Active,
    Trashed,
    Purged,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Lead => "lead",
            ApplicationStatus::Active => "active",
            ApplicationStatus::Trashed => "trashed",
            ApplicationStatus::Purged => "purged",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a submission came from; decides the initial lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOrigin {
    /// Public application wizard: record starts as a lead.
    Public,
    /// Internal sales form: record starts active.
    Staff,
}

/// Hierarchy placement of an application. The full path is passed explicitly;
/// nothing reads an ambient "currently selected" node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub program: ProgramId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_program: Option<SubProgramId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseId>,
}

impl Placement {
    /// The most specific node of the path; forms and field resolution key off
    /// this.
    pub fn target_node(&self) -> NodeRef {
        if let Some(course) = self.course {
            NodeRef::Course(course)
        } else if let Some(sub_program) = self.sub_program {
            NodeRef::SubProgram(sub_program)
        } else {
            NodeRef::Program(self.program)
        }
    }
}

/// Postal address block; every component is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

/// Canonical Student attributes, distinct from admin-defined dynamic fields.
/// Only first name and mobile are guaranteed present (possibly as sentinels).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_husband_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub mobile: String,
    #[serde(default)]
    pub permanent_address: Address,
    #[serde(default)]
    pub correspondence_address: Address,
}

impl StudentProfile {
    /// Apply one reconciled canonical write.
    pub(crate) fn apply(
        &mut self,
        attribute: CanonicalAttribute,
        value: &str,
    ) -> Result<(), IntakeError> {
        match attribute {
            CanonicalAttribute::FirstName => self.first_name = value.to_string(),
            CanonicalAttribute::LastName => self.last_name = Some(value.to_string()),
            CanonicalAttribute::Email => self.email = Some(value.to_string()),
            CanonicalAttribute::Mobile => self.mobile = value.to_string(),
            CanonicalAttribute::Dob => {
                self.dob = Some(crate::intake::parse_dob("dob", value)?);
            }
            CanonicalAttribute::Gender => self.gender = Some(value.to_string()),
            CanonicalAttribute::MaritalStatus => {
                self.marital_status = Some(value.to_string())
            }
        }
        Ok(())
    }

    /// Identity key used by the duplicate-submission guard: email when
    /// present, otherwise a mobile-derived key.
    pub fn contact_key(&self) -> String {
        match &self.email {
            Some(email) if !email.is_empty() => email.to_lowercase(),
            _ => format!("user_{}", self.mobile),
        }
    }
}

/// Persisted value for one (application, field) pair. At most one per pair;
/// amendments overwrite in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicValue {
    pub field: FieldId,
    pub label: String,
    pub value: String,
}

/// Stored document reference returned by the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub field: FieldId,
    pub document_type: String,
    pub storage_key: String,
}

/// Payment record produced from transaction-shaped submission fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub amount: f64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}
