//! Reporter configuration, built from the host's run parameters.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::errors::ConfigError;

/// How much the reporter prints.
///
/// Verbosity levels are incremental: each level prints everything the levels below it print,
/// for run messages at least. Per-test lines have their own rules, see
/// [`TestReporter`](crate::TestReporter).
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Errors and the per-source summary only.
    Quiet,

    /// Warnings, failed tests and the per-source summary.
    #[default]
    Minimal,

    /// Every test result, informational messages and the run summary.
    Normal,

    /// Everything above, plus captured output for every test.
    Detailed,
}

impl FromStr for Verbosity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "q" | "quiet" => Ok(Verbosity::Quiet),
            "m" | "minimal" => Ok(Verbosity::Minimal),
            "n" | "normal" => Ok(Verbosity::Normal),
            "d" | "detailed" | "diag" | "diagnostic" => Ok(Verbosity::Detailed),
            _ => Err(ConfigError::InvalidVerbosity {
                value: s.to_owned(),
            }),
        }
    }
}

/// Which detail sections start out collapsed in a CI log viewer.
///
/// These never decide whether something is printed, only how it is presented.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollapseSettings {
    pub stack_traces: bool,
    pub error_messages: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl Default for CollapseSettings {
    fn default() -> Self {
        Self {
            stack_traces: false,
            error_messages: false,
            stdout: true,
            stderr: true,
        }
    }
}

/// Configuration for a [`TestReporter`](crate::TestReporter). Immutable once the run starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReporterConfig {
    /// How much to print.
    pub verbosity: Verbosity,

    /// Which sections start collapsed.
    pub collapse: CollapseSettings,

    /// Printed after the details of each failed test. Nothing is printed if this is empty.
    pub failed_test_separator: String,

    /// Short framework label shown next to each source in the summary, e.g. `net8.0`.
    pub target_framework: Option<String>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            collapse: CollapseSettings::default(),
            // Written with a trailing newline, so this leaves two blank lines.
            failed_test_separator: "\n".to_owned(),
            target_framework: None,
        }
    }
}

impl ReporterConfig {
    /// Builds a configuration from the host's run parameters.
    ///
    /// Keys are matched case-insensitively and unknown keys are ignored. Every key is optional,
    /// but the set itself must not be empty.
    pub fn from_parameters<I, K, V>(parameters: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut seen_any = false;

        for (key, value) in parameters {
            seen_any = true;
            let (key, value) = (key.as_ref(), value.as_ref());

            match key.to_ascii_lowercase().as_str() {
                "verbosity" => config.verbosity = value.parse()?,
                "collapsestacktraces" => config.collapse.stack_traces = parse_bool(key, value)?,
                "collapseerrormessages" => {
                    config.collapse.error_messages = parse_bool(key, value)?
                }
                "collapsestdout" => config.collapse.stdout = parse_bool(key, value)?,
                "collapsestderr" => config.collapse.stderr = parse_bool(key, value)?,
                "failedtestseparator" => config.failed_test_separator = value.to_owned(),
                "targetframework" => {
                    config.target_framework = Some(short_framework_name(value))
                        .filter(|framework| !framework.is_empty());
                }
                _ => tracing::debug!(key, "ignoring unrecognized reporter parameter"),
            }
        }

        if !seen_any {
            return Err(ConfigError::Empty);
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBool {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

static FRAMEWORK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.(NETCoreApp|NETFramework|NETStandard),Version=v(\d+(?:\.\d+)*)$")
        .expect("framework regex is valid")
});

/// Converts a full target framework moniker into its short display form.
///
/// `.NETCoreApp,Version=v8.0` becomes `net8.0`, `.NETFramework,Version=v4.7.2` becomes
/// `net472` and `.NETStandard,Version=v2.0` becomes `netstandard2.0`. Anything else is
/// returned trimmed but otherwise unchanged.
pub fn short_framework_name(raw: &str) -> String {
    let raw = raw.trim();
    let Some(captures) = FRAMEWORK_REGEX.captures(raw) else {
        return raw.to_owned();
    };

    let version = &captures[2];
    match &captures[1] {
        "NETCoreApp" => {
            // .NET Core 1.x-3.x kept the netcoreapp prefix.
            let major: u32 = version
                .split('.')
                .next()
                .and_then(|major| major.parse().ok())
                .unwrap_or(0);
            if major < 5 {
                format!("netcoreapp{version}")
            } else {
                format!("net{version}")
            }
        }
        "NETFramework" => format!("net{}", version.replace('.', "")),
        _ => format!("netstandard{version}"),
    }
}
