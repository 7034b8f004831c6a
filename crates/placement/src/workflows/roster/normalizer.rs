/// Header cells as spreadsheets export them: BOM, zero-width spaces and repeated
/// whitespace removed.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn optional_cell(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1" | "x"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_strips_bom_and_collapses_spaces() {
        assert_eq!(
            normalize_header("\u{feff}Internship   Training Centre "),
            "Internship Training Centre"
        );
    }

    #[test]
    fn blank_cells_become_none() {
        assert_eq!(optional_cell(Some("  ")), None);
        assert_eq!(optional_cell(None), None);
        assert_eq!(optional_cell(Some(" F ")), Some("F".to_string()));
    }

    #[test]
    fn lock_markers_are_recognized() {
        assert!(is_truthy("Yes"));
        assert!(is_truthy(" x"));
        assert!(!is_truthy("no"));
        assert!(!is_truthy(""));
    }
}
