const INVISIBLE: [char; 2] = ['\u{feff}', '\u{200b}'];

/// Join key form of an id column: invisible characters removed, trimmed and
/// lowercased so hex cell ids and UUIDs compare regardless of export casing.
pub(crate) fn normalize_identifier(value: &str) -> String {
    value.replace(INVISIBLE, "").trim().to_ascii_lowercase()
}

/// Display labels keep their casing; only whitespace is collapsed.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(INVISIBLE, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
