//! String rules for turning a raw caller identity into an operator identifier.
//!
//! Example:
//! "AIDAEXAMPLE:John.Doe\n"  =>  "johndoe"

/// Simplify a raw identity: keep the last `:` segment, drop every `.`,
/// trim whitespace and lowercase.
pub fn simplify(raw: &str) -> String {
    let last = raw.rsplit(':').next().unwrap_or(raw);
    last.replace('.', "").trim().to_lowercase()
}

/// True when the identity belongs to an automated build system rather than a
/// human operator.
pub fn is_ci_identity(raw: &str, ci_prefixes: &[String]) -> bool {
    let simplified = simplify(raw);
    ci_prefixes
        .iter()
        .any(|prefix| simplified.starts_with(&prefix.to_lowercase()))
}

/// Simplify `raw` and cut it down to at most `max_len` characters.
pub fn normalize(raw: &str, max_len: usize) -> String {
    let simplified = simplify(raw);
    match simplified.char_indices().nth(max_len) {
        Some((cut, _)) => simplified[..cut].to_string(),
        None => simplified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefixes() -> Vec<String> {
        vec!["awscodebuild".to_string(), "awscodepipeline".to_string()]
    }

    #[test]
    fn simplify_keeps_last_segment() {
        assert_eq!(simplify("AIDAEXAMPLE:john.doe"), "johndoe");
        assert_eq!(simplify("a:b:C.D"), "cd");
        assert_eq!(simplify("  Jane.Doe \n"), "janedoe");
    }

    #[test]
    fn simplify_trims_after_removing_dots() {
        assert_eq!(simplify("role: Bob.\n"), "bob");
    }

    #[test]
    fn ci_identities_are_rejected() {
        assert!(is_ci_identity("AIDAEXAMPLE:awscodebuild-service", &prefixes()));
        assert!(is_ci_identity("AROA:AWSCodePipeline-deploy", &prefixes()));
        assert!(!is_ci_identity("AIDAEXAMPLE:john.doe", &prefixes()));
    }

    #[test]
    fn ci_prefix_must_lead_the_name() {
        assert!(!is_ci_identity("AIDA:john-awscodebuild", &prefixes()));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(normalize("verylongusername.with.dots", 15), "verylongusernam");
        assert_eq!(normalize("short", 15), "short");
        assert_eq!(normalize("exactlyfifteen1", 15), "exactlyfifteen1");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(normalize("ééééé", 3), "ééé");
    }
}
