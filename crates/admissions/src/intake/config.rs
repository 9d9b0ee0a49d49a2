use crate::forms::CanonicalAttribute;

use super::mapping::SynonymTable;

/// Sentinel written to `first_name` when a submission never supplies one.
/// Public submissions are accepted as low-quality leads rather than rejected.
pub const PLACEHOLDER_FIRST_NAME: &str = "Student";

/// Sentinel written to `mobile` when a submission never supplies one.
pub const PLACEHOLDER_MOBILE: &str = "0000000000";

/// Tunables for submission reconciliation, handed to the service at
/// construction time.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Substitute for a missing first name.
    pub placeholder_first_name: String,
    /// Substitute for a missing mobile number.
    pub placeholder_mobile: String,
    /// Whether a value that matched a canonical attribute is also retained as
    /// a dynamic value. The canonical write always happens.
    pub retain_matched_values: bool,
    /// Admin-supplied synonym table extensions, appended after the built-ins.
    pub extra_synonyms: Vec<(String, CanonicalAttribute)>,
}

impl IntakeConfig {
    pub fn synonym_table(&self) -> SynonymTable {
        let mut table = SynonymTable::with_defaults();
        for (synonym, attribute) in &self.extra_synonyms {
            table.push(synonym, *attribute);
        }
        table
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            placeholder_first_name: PLACEHOLDER_FIRST_NAME.to_string(),
            placeholder_mobile: PLACEHOLDER_MOBILE.to_string(),
            retain_matched_values: true,
            extra_synonyms: Vec::new(),
        }
    }
}
