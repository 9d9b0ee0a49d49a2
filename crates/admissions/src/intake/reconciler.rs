use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{FieldId, FieldType};
use crate::forms::{CanonicalAttribute, FieldDescriptor, FormSpec};

use super::config::IntakeConfig;
use super::mapping::SynonymTable;

/// Labels that are special-cased into a Transaction record instead of plain
/// dynamic values. Matched exactly, not through the synonym table.
const TRANSACTION_ID_LABEL: &str = "Transaction ID";
const TRANSACTION_AMOUNT_LABEL: &str = "Amount";

/// Raw file payload submitted out-of-band, keyed by field id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A completed form as submitted: explicit canonical identity block plus raw
/// dynamic values and files keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub canonical: BTreeMap<CanonicalAttribute, String>,
    #[serde(default)]
    pub values: BTreeMap<FieldId, String>,
    #[serde(default)]
    pub files: BTreeMap<FieldId, FilePayload>,
}

/// Whether placeholder substitution applies. Partial amendments must not
/// inject placeholders for attributes the patch simply did not touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    Full,
    Partial,
}

/// Marks canonical attributes that were filled with a sentinel instead of a
/// submitted value, so downstream reporting can flag low-quality leads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderFlags {
    pub first_name: bool,
    pub mobile: bool,
}

/// A dynamic value ready to persist. The label is snapshotted so the value
/// stays readable if the definition is later deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicValueDraft {
    pub field: FieldId,
    pub label: String,
    pub value: String,
}

/// A document to store, produced from a file-typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    pub field: FieldId,
    pub document_type: String,
    pub file: FilePayload,
}

/// Transaction-shaped input recognized during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub transaction_id: String,
    pub amount: Option<f64>,
}

/// Everything a submission resolves into. Persisting this atomically is the
/// caller's job; reconciliation itself has no side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledSubmission {
    pub canonical: BTreeMap<CanonicalAttribute, String>,
    pub dynamic_values: Vec<DynamicValueDraft>,
    pub documents: Vec<DocumentDraft>,
    pub transaction: Option<TransactionDraft>,
    pub used_placeholder: PlaceholderFlags,
}

/// Reconciliation failures. All of them are validation-class: the offending
/// field is identified and nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("field {0} is not part of this form")]
    UnknownField(FieldId),
    #[error("field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl IntakeError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        IntakeError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Map a submitted value set onto canonical attributes, dynamic values,
/// documents, and an optional transaction.
///
/// Guarantees: every submitted field id lands somewhere or the whole call
/// fails; explicit canonical block entries win over synonym-matched dynamic
/// fields; in [`ReconcileMode::Full`] a still-missing first name or mobile is
/// filled with the configured sentinel and flagged.
pub fn reconcile(
    form: &FormSpec,
    raw: &RawSubmission,
    table: &SynonymTable,
    config: &IntakeConfig,
    mode: ReconcileMode,
) -> Result<ReconciledSubmission, IntakeError> {
    // Reject unknown ids up front so a bad submission has no partial output.
    for id in raw.values.keys().chain(raw.files.keys()) {
        if form.descriptor(*id).is_none() {
            return Err(IntakeError::UnknownField(*id));
        }
    }

    let mut canonical: BTreeMap<CanonicalAttribute, String> = BTreeMap::new();
    for (attribute, value) in &raw.canonical {
        let value = value.trim();
        if !value.is_empty() {
            canonical.insert(*attribute, value.to_string());
        }
    }

    let mut dynamic_values = Vec::new();
    let mut transaction_id: Option<String> = None;
    let mut transaction_amount: Option<f64> = None;

    // Walk the form in render order so persisted values keep a stable order.
    for descriptor in &form.dynamic {
        let Some(value) = raw.values.get(&descriptor.id) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        validate_typed_value(descriptor, value)?;

        if descriptor.label == TRANSACTION_ID_LABEL {
            transaction_id = Some(value.to_string());
            continue;
        }
        if descriptor.label == TRANSACTION_AMOUNT_LABEL {
            let amount: f64 = value.parse().map_err(|_| {
                IntakeError::invalid(&descriptor.label, "amount must be numeric")
            })?;
            transaction_amount = Some(amount);
            continue;
        }

        match table.match_label(&descriptor.label) {
            Some(attribute) => {
                if attribute == CanonicalAttribute::Dob {
                    parse_dob(&descriptor.label, value)?;
                }
                // First write wins: the explicit canonical block, or an
                // earlier matching dynamic field, takes precedence.
                canonical.entry(attribute).or_insert_with(|| value.to_string());
                if config.retain_matched_values {
                    dynamic_values.push(DynamicValueDraft {
                        field: descriptor.id,
                        label: descriptor.label.clone(),
                        value: value.to_string(),
                    });
                }
            }
            None => dynamic_values.push(DynamicValueDraft {
                field: descriptor.id,
                label: descriptor.label.clone(),
                value: value.to_string(),
            }),
        }
    }

    if let Some(value) = canonical.get(&CanonicalAttribute::Dob) {
        parse_dob("dob", value)?;
    }

    let mut documents = Vec::new();
    for (id, payload) in &raw.files {
        let descriptor = form.descriptor(*id).expect("checked above");
        if descriptor.field_type != FieldType::File {
            return Err(IntakeError::invalid(
                &descriptor.label,
                "only file fields accept file payloads",
            ));
        }
        documents.push(DocumentDraft {
            field: *id,
            document_type: descriptor.label.clone(),
            file: payload.clone(),
        });
    }

    let mut used_placeholder = PlaceholderFlags::default();
    if mode == ReconcileMode::Full {
        if !canonical.contains_key(&CanonicalAttribute::FirstName) {
            canonical.insert(
                CanonicalAttribute::FirstName,
                config.placeholder_first_name.clone(),
            );
            used_placeholder.first_name = true;
        }
        if !canonical.contains_key(&CanonicalAttribute::Mobile) {
            canonical.insert(CanonicalAttribute::Mobile, config.placeholder_mobile.clone());
            used_placeholder.mobile = true;
        }
    }

    let transaction = if transaction_id.is_some() || transaction_amount.is_some() {
        Some(TransactionDraft {
            transaction_id: transaction_id.unwrap_or_default(),
            amount: transaction_amount,
        })
    } else {
        None
    };

    Ok(ReconciledSubmission {
        canonical,
        dynamic_values,
        documents,
        transaction,
        used_placeholder,
    })
}

fn validate_typed_value(descriptor: &FieldDescriptor, value: &str) -> Result<(), IntakeError> {
    match descriptor.field_type {
        FieldType::Dropdown => {
            if !descriptor.options.iter().any(|option| option == value) {
                return Err(IntakeError::invalid(
                    &descriptor.label,
                    format!("'{value}' is not one of the configured options"),
                ));
            }
        }
        FieldType::Date => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                IntakeError::invalid(&descriptor.label, "expected a YYYY-MM-DD date")
            })?;
        }
        FieldType::File => {
            return Err(IntakeError::invalid(
                &descriptor.label,
                "file fields are submitted as file payloads, not inline values",
            ));
        }
        FieldType::Text | FieldType::Number => {}
    }
    Ok(())
}

pub(crate) fn parse_dob(field: &str, value: &str) -> Result<NaiveDate, IntakeError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| IntakeError::invalid(field, "expected a YYYY-MM-DD date of birth"))
}
