//! URL list parsing
//!
//! A submitted list is plain text with one candidate per line. Lines are
//! trimmed and kept only when they end in a recognized manifest suffix
//! (compared case-insensitively); everything else is dropped silently.

/// Recognized manifest suffixes
pub const MANIFEST_SUFFIXES: [&str; 2] = [".mpd", ".m3u8"];

/// Whether a line names a manifest the pipeline accepts
pub fn is_manifest_url(line: &str) -> bool {
    let lower = line.trim().to_ascii_lowercase();
    MANIFEST_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Extract manifest URLs from a newline-separated list, preserving order
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| is_manifest_url(line))
        .map(str::to_string)
        .collect()
}

/// Extract manifest URLs from raw file bytes
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so one mangled
/// line cannot hide the valid ones.
pub fn parse_url_bytes(bytes: &[u8]) -> Vec<String> {
    parse_url_list(&String::from_utf8_lossy(bytes))
}

/// Whether an uploaded file name looks like a URL list (`.txt`)
pub fn is_text_file_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".txt")
}
