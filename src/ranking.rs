// Preference order between two install paths of the same application
use crate::validator::path_key;
use std::path::Path;

/// Release-channel markers that make a path a secondary install
const VARIANT_KEYWORDS: &[&str] = &["canary", "ptb", "beta", "alpha", "insider", "dev"];

fn is_program_root(key: &str) -> bool {
    key.contains("program files") || key.contains("\\programs\\")
}

fn has_variant(key: &str) -> bool {
    VARIANT_KEYWORDS.iter().any(|k| key.contains(k))
}

/// True when `a` should replace `b` as the canonical install.
///
/// Tie-breaks in order: program-install root over AppData, shorter path,
/// path without a variant keyword. A full tie keeps `b`.
pub fn better(a: &Path, b: &Path) -> bool {
    let a_key = path_key(a);
    let b_key = path_key(b);

    if is_program_root(&a_key) && b_key.contains("appdata") {
        return true;
    }
    if a_key.contains("appdata") && is_program_root(&b_key) {
        return false;
    }

    let a_len = a.to_string_lossy().chars().count();
    let b_len = b.to_string_lossy().chars().count();
    if a_len != b_len {
        return a_len < b_len;
    }

    match (has_variant(&a_key), has_variant(&b_key)) {
        (false, true) => true,
        _ => false,
    }
}
