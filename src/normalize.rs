/// Maximum length of a normalized module name.
pub const MAX_NAME_LENGTH: usize = 47;

/// Maps a module or class name to a lookup key: lower-cased, stripped of
/// everything but `[a-z0-9_-]`, capped at [`MAX_NAME_LENGTH`] characters.
pub fn normalize_module_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .take(MAX_NAME_LENGTH)
        .collect()
}
