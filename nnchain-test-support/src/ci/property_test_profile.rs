//! Property-test run profile parsing for CI and local overrides.
//!
//! Suites read their case count and fork mode from one place so a CI job
//! can scale every property suite with a single environment variable.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const CASES_ENV_KEY: &str = "NNCHAIN_PBT_CASES";
/// Environment variable enabling forked proptest execution.
pub const FORK_ENV_KEY: &str = "NNCHAIN_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads a profile from the process environment, falling back to the
    /// supplied defaults for unset or malformed values.
    ///
    /// # Examples
    ///
    /// ```
    /// use nnchain_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Builds a profile from an arbitrary key lookup.
    ///
    /// Malformed values are logged at `warn` and replaced by the default.
    ///
    /// # Examples
    ///
    /// ```
    /// use nnchain_test_support::ci::property_test_profile::{CASES_ENV_KEY, ProptestRunProfile};
    ///
    /// let profile = ProptestRunProfile::from_lookup(64, false, |key| {
    ///     (key == CASES_ENV_KEY).then(|| "512".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 512);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn from_lookup<F>(default_cases: u32, default_fork: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cases = override_or(&lookup, CASES_ENV_KEY, default_cases, parse_cases);
        let fork = override_or(&lookup, FORK_ENV_KEY, default_fork, parse_flag);
        Self { cases, fork }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

fn override_or<T, L, P>(lookup: &L, key: &'static str, default: T, parse: P) -> T
where
    T: Copy,
    L: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, &'static str>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            reason,
            "ignoring malformed property-test override",
        );
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, &'static str> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("cases must be positive"),
        Ok(cases) => Ok(cases),
        Err(_) => Err("cases must be an unsigned integer"),
    }
}

fn parse_flag(raw: &str) -> Result<bool, &'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected one of true/false/1/0/yes/no/on/off"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn profile_with(cases: Option<&str>, fork: Option<&str>, default_fork: bool) -> ProptestRunProfile {
        ProptestRunProfile::from_lookup(64, default_fork, |key| match key {
            CASES_ENV_KEY => cases.map(str::to_owned),
            FORK_ENV_KEY => fork.map(str::to_owned),
            _ => None,
        })
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = profile_with(None, None, false);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 250 ", 250)]
    #[case("25000", 25_000)]
    fn valid_case_overrides_apply(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(profile_with(Some(raw), None, false).cases(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("abc")]
    #[case("")]
    fn invalid_case_overrides_fall_back(#[case] raw: &str) {
        assert_eq!(profile_with(Some(raw), None, false).cases(), 64);
    }

    #[rstest]
    #[case("true", true)]
    #[case("YES", true)]
    #[case("1", true)]
    #[case("on", true)]
    #[case("false", false)]
    #[case("No", false)]
    #[case("0", false)]
    #[case("off", false)]
    fn valid_fork_overrides_apply(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(profile_with(None, Some(raw), !expected).fork(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("maybe")]
    #[case("2")]
    fn invalid_fork_overrides_fall_back(#[case] raw: &str) {
        assert!(profile_with(None, Some(raw), true).fork());
    }
}
