use crate::forms::CanonicalAttribute;

use super::normalizer::normalize_label;

/// Built-in synonym table mapping free-text field labels onto canonical
/// Student attributes. Order matters: on a substring fallback the first entry
/// that matches wins, so more specific synonyms come before looser ones.
pub const DEFAULT_SYNONYMS: &[(&str, CanonicalAttribute)] = &[
    ("first name", CanonicalAttribute::FirstName),
    ("full name", CanonicalAttribute::FirstName),
    ("name", CanonicalAttribute::FirstName),
    ("last name", CanonicalAttribute::LastName),
    ("mobile number", CanonicalAttribute::Mobile),
    ("contact number", CanonicalAttribute::Mobile),
    ("whatsapp number", CanonicalAttribute::Mobile),
    ("email", CanonicalAttribute::Email),
    ("dob", CanonicalAttribute::Dob),
    ("date of birth", CanonicalAttribute::Dob),
    ("gender", CanonicalAttribute::Gender),
    ("marital status", CanonicalAttribute::MaritalStatus),
];

/// Ordered label-to-attribute synonym table. Admins can extend it through
/// configuration without code changes; extensions append after the built-ins
/// and therefore lose ties against them.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: Vec<(String, CanonicalAttribute)>,
}

impl SynonymTable {
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_SYNONYMS
            .iter()
            .map(|(synonym, attribute)| (normalize_label(synonym), *attribute))
            .collect();
        Self { entries }
    }

    pub fn push(&mut self, synonym: &str, attribute: CanonicalAttribute) {
        self.entries.push((normalize_label(synonym), attribute));
    }

    /// Match a field label against the table: exact normalized match first,
    /// then substring containment in table order. Deliberately loose; ties go
    /// to table order, not longest match.
    pub fn match_label(&self, label: &str) -> Option<CanonicalAttribute> {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return None;
        }
        if let Some((_, attribute)) = self
            .entries
            .iter()
            .find(|(synonym, _)| *synonym == normalized)
        {
            return Some(*attribute);
        }
        self.entries
            .iter()
            .find(|(synonym, _)| normalized.contains(synonym.as_str()))
            .map(|(_, attribute)| *attribute)
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
