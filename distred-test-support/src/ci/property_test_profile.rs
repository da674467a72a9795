//! Property-test run profile read from the environment.
//!
//! Every property suite in the workspace loads its case count and fork mode
//! through [`ProptestRunProfile`], so CI can scale them all from one place.

use std::env;

/// Environment variable overriding the number of proptest cases.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable enabling forked proptest execution.
pub const DISTRED_PBT_FORK_ENV_KEY: &str = "DISTRED_PBT_FORK";

/// Case count and fork mode for a property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads the profile, falling back to the given defaults for missing or
    /// malformed overrides.
    ///
    /// # Examples
    ///
    /// ```
    /// use distred_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_or(PROGTEST_CASES_ENV_KEY, default_cases, parse_cases),
            fork: override_or(DISTRED_PBT_FORK_ENV_KEY, default_fork, parse_switch),
        }
    }

    /// Cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether cases run in forked subprocesses.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

fn override_or<T: Copy>(
    key: &'static str,
    default: T,
    parse: fn(&str) -> Result<T, String>,
) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            reason = %reason,
            "ignoring malformed property-test override",
        );
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("case count must be positive".to_owned()),
        Ok(cases) => Ok(cases),
        Err(error) => Err(format!("not a case count: {error}")),
    }
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("`{other}` is not a switch value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Restores an environment variable when dropped.
    struct ScopedVar {
        key: &'static str,
        previous: Option<String>,
    }

    impl ScopedVar {
        fn new(key: &'static str, value: Option<&str>) -> Self {
            let previous = env::var(key).ok();
            Self::apply(key, value);
            Self { key, previous }
        }

        fn apply(key: &'static str, value: Option<&str>) {
            // SAFETY: tests serialise environment access with ENV_LOCK.
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    impl Drop for ScopedVar {
        fn drop(&mut self) {
            Self::apply(self.key, self.previous.as_deref());
        }
    }

    fn load_with(
        cases: Option<&str>,
        fork: Option<&str>,
        default_fork: bool,
    ) -> ProptestRunProfile {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _cases = ScopedVar::new(PROGTEST_CASES_ENV_KEY, cases);
        let _fork = ScopedVar::new(DISTRED_PBT_FORK_ENV_KEY, fork);
        ProptestRunProfile::load(64, default_fork)
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = load_with(None, None, false);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
    }

    #[rstest]
    #[case::one("1", 1)]
    #[case::padded(" 250 ", 250)]
    #[case::large("25000", 25_000)]
    fn valid_case_overrides_apply(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(load_with(Some(raw), None, false).cases(), expected);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-1")]
    #[case::text("abc")]
    fn malformed_case_overrides_fall_back(#[case] raw: &str) {
        assert_eq!(load_with(Some(raw), None, false).cases(), 64);
    }

    #[rstest]
    #[case::true_word("true", true)]
    #[case::upper("TRUE", true)]
    #[case::digit_on("1", true)]
    #[case::on("on", true)]
    #[case::false_word("false", false)]
    #[case::digit_off("0", false)]
    #[case::no("no", false)]
    fn valid_fork_overrides_apply(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(load_with(None, Some(raw), !expected).fork(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::maybe("maybe")]
    #[case::two("2")]
    fn malformed_fork_overrides_fall_back(#[case] raw: &str) {
        assert!(load_with(None, Some(raw), true).fork());
    }
}
