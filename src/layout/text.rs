use crate::config::LayoutConfig;

/// Resolve the description label for one layer: trimmed, upper-cased, with
/// the interpretation prefixed when one is present.
pub(crate) fn resolve_label(geology: &str, interp: Option<&str>) -> String {
    let geology = geology.trim();
    match interp.map(str::trim).filter(|s| !s.is_empty()) {
        Some(interp) => format!("{} - {}", interp.to_uppercase(), geology.to_uppercase()),
        None => geology.to_uppercase(),
    }
}

/// Wrapped line count for a label under the constant-width heuristic.
pub(super) fn estimate_line_count(label: &str, config: &LayoutConfig) -> usize {
    let chars = label.chars().count();
    chars.div_ceil(config.line_width_chars.max(1))
}

/// Estimated vertical space a label needs. A monotonically increasing step
/// function of label length; an empty label needs nothing (the raw formula
/// would go negative there).
pub(super) fn estimate_text_height(label: &str, config: &LayoutConfig) -> f64 {
    let lines = estimate_line_count(label, config);
    if lines == 0 {
        return 0.0;
    }
    lines as f64 * config.line_unit_height - config.line_margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_label_uppercases_and_trims() {
        assert_eq!(resolve_label("  silte arenoso ", None), "SILTE ARENOSO");
    }

    #[test]
    fn resolve_label_prefixes_interpretation() {
        assert_eq!(
            resolve_label("areia fina", Some("aterro")),
            "ATERRO - AREIA FINA"
        );
    }

    #[test]
    fn resolve_label_ignores_blank_interpretation() {
        assert_eq!(resolve_label("argila", Some("   ")), "ARGILA");
    }

    #[test]
    fn empty_label_estimates_zero_height() {
        let config = LayoutConfig::default();
        assert_eq!(estimate_text_height("", &config), 0.0);
    }

    #[test]
    fn height_is_a_step_function_of_length() {
        let config = LayoutConfig::default();
        // 35 chars per line, 0.45 per line, minus 0.1 once.
        let one_line = estimate_text_height(&"A".repeat(10), &config);
        let full_line = estimate_text_height(&"A".repeat(35), &config);
        let two_lines = estimate_text_height(&"A".repeat(36), &config);
        assert!((one_line - 0.35).abs() < 1e-9);
        assert_eq!(one_line, full_line);
        assert!((two_lines - 0.80).abs() < 1e-9);
    }

    #[test]
    fn height_never_decreases_with_length() {
        let config = LayoutConfig::default();
        let mut previous = 0.0;
        for len in 0..120 {
            let height = estimate_text_height(&"x".repeat(len), &config);
            assert!(height >= previous, "shrank at length {len}");
            previous = height;
        }
    }
}
