use smsgate_config::PasswordConfig;

/// Gate a request on the `password` parameter.
///
/// Returns true when gating is disabled, or when the parameter is present
/// and byte-for-byte equal to the configured value. Absent and mismatched
/// passwords are indistinguishable to the caller (both end in 403).
///
/// Comparison is plain equality, not constant-time, for parity with the
/// original gateway's behavior.
pub fn check_password(config: &PasswordConfig, provided: Option<&str>) -> bool {
    if !config.required {
        return true;
    }
    match provided {
        Some(given) => given == config.value,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gated(value: &str) -> PasswordConfig {
        PasswordConfig {
            required: true,
            value: value.into(),
        }
    }

    #[test]
    fn disabled_accepts_anything() {
        let config = PasswordConfig::default();
        assert!(check_password(&config, None));
        assert!(check_password(&config, Some("whatever")));
        assert!(check_password(&config, Some("")));
    }

    #[test]
    fn absent_is_rejected() {
        assert!(!check_password(&gated("secret"), None));
    }

    #[test]
    fn empty_is_rejected() {
        assert!(!check_password(&gated("secret"), Some("")));
    }

    #[test]
    fn mismatch_is_rejected() {
        assert!(!check_password(&gated("secret"), Some("wrong")));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(check_password(&gated("secret"), Some("secret")));
        assert!(!check_password(&gated("secret"), Some("Secret")));
    }

    #[test]
    fn empty_configured_password_matches_empty_param() {
        // Required with an empty value: only an explicitly empty parameter
        // passes, absence still fails.
        assert!(check_password(&gated(""), Some("")));
        assert!(!check_password(&gated(""), None));
    }
}
