//! Canonical forms for role names and user handles.
//!
//! Every directory operation normalizes its inputs first, so `" Ops "`, `"OPS"`
//! and `"ops"` address the same role and `"@Alice"` the same user as `"alice"`.

/// Maximum length of a normalized name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Normalize a role name: trim, flatten line breaks, cap length, lower-case.
pub fn normalize_role_name(raw: &str) -> String {
    sanitize(raw)
}

/// Normalize a user handle: like role names, with leading `@` removed.
pub fn normalize_handle(raw: &str) -> String {
    sanitize(raw.trim().trim_start_matches('@'))
}

fn sanitize(raw: &str) -> String {
    let flattened = raw.trim().replace(['\n', '\r'], " ");
    let capped: String = flattened.chars().take(MAX_NAME_LEN).collect();
    capped.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_fold_case_and_trim() {
        assert_eq!(normalize_role_name("  Ops "), "ops");
        assert_eq!(normalize_role_name("OPS"), normalize_role_name("ops"));
    }

    #[test]
    fn line_breaks_become_spaces() {
        assert_eq!(normalize_role_name("on\ncall\rteam"), "on call team");
    }

    #[test]
    fn whitespace_only_normalizes_to_empty() {
        assert_eq!(normalize_role_name(" \n\t "), "");
        assert_eq!(normalize_handle(" @ "), "");
        assert_eq!(normalize_handle("@@@"), "");
    }

    #[test]
    fn handles_drop_at_prefix() {
        assert_eq!(normalize_handle("@Alice"), "alice");
        assert_eq!(normalize_handle("  @bob_99 "), "bob_99");
        assert_eq!(normalize_handle("carol@example"), "carol@example");
    }

    #[test]
    fn length_is_capped_by_characters() {
        let long = "é".repeat(MAX_NAME_LEN + 20);
        let normalized = normalize_role_name(&long);
        assert_eq!(normalized.chars().count(), MAX_NAME_LEN);
    }
}
