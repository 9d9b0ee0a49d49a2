/// Normalize an admin-entered field label for synonym matching: strip BOM and
/// zero-width characters, collapse internal whitespace, lowercase.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_case() {
        assert_eq!(normalize_label("  Full   Name "), "full name");
        assert_eq!(normalize_label("WhatsApp\tNumber"), "whatsapp number");
    }

    #[test]
    fn strips_zero_width_noise() {
        assert_eq!(normalize_label("\u{feff}Email\u{200b}"), "email");
    }
}
