use serde::{Deserialize, Serialize};
use std::{
    env, fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Sentinel that switches an option off.
pub const DISABLED: &str = "disabled";
/// Sentinel that switches a constant flag on.
pub const ENABLED: &str = "enabled";
/// Check selection that turns on every check category.
pub const CHECK_EVERYTHING: &str = "all";

pub const DEFAULT_OUTPUT_FILE: &str = "cppcheck_report.txt";
pub const DEFAULT_CONFIG_FILE: &str = "cppcheck-action.toml";

pub const PULL_REQUEST_EVENT: &str = "pull_request";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("could not read options file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse options file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not write options file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An access token that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(#[allow(dead_code)] String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Facts about the triggering CI run. All of these must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubContext {
    pub event_name: String,
    pub repository: String,
    pub git_ref: String,
    pub head_ref: String,
    pub base_ref: String,
    pub actor: String,
    pub repository_owner: String,
    pub token: Secret,
}

/// Where the run is pointed. Only informational; does not change the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    pub target_repository: String,
    pub pull_request_repository: String,
    pub target_branch: String,
    pub pull_request_branch: String,
}

/// Raw option values, one per cppcheck switch the action exposes.
///
/// Each value is either [`DISABLED`], [`ENABLED`], or a payload string such as
/// a platform name or a depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    pub enable: String,
    pub check_library: String,
    pub skip_preprocessor: String,
    pub inline_suppression: String,
    pub inconclusive: String,
    pub force: String,
    pub exclude_check: String,
    pub force_language: String,
    pub max_ctu_depth: String,
    pub platform: String,
    pub std: String,
    pub other_options: String,
    pub output_file: String,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            enable: CHECK_EVERYTHING.to_string(),
            check_library: DISABLED.to_string(),
            skip_preprocessor: DISABLED.to_string(),
            inline_suppression: DISABLED.to_string(),
            inconclusive: ENABLED.to_string(),
            force: DISABLED.to_string(),
            exclude_check: DISABLED.to_string(),
            force_language: DISABLED.to_string(),
            max_ctu_depth: DISABLED.to_string(),
            platform: DISABLED.to_string(),
            std: DISABLED.to_string(),
            other_options: DISABLED.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

/// Identifies one field of [`AnalyzerOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Enable,
    CheckLibrary,
    SkipPreprocessor,
    InlineSuppression,
    Inconclusive,
    Force,
    ExcludeCheck,
    ForceLanguage,
    MaxCtuDepth,
    Platform,
    Std,
    OtherOptions,
    OutputFile,
}

impl OptionKey {
    pub const ALL: [OptionKey; 13] = [
        OptionKey::Enable,
        OptionKey::CheckLibrary,
        OptionKey::SkipPreprocessor,
        OptionKey::InlineSuppression,
        OptionKey::Inconclusive,
        OptionKey::Force,
        OptionKey::ExcludeCheck,
        OptionKey::ForceLanguage,
        OptionKey::MaxCtuDepth,
        OptionKey::Platform,
        OptionKey::Std,
        OptionKey::OtherOptions,
        OptionKey::OutputFile,
    ];

    /// Environment variable the action runner sets for this input.
    pub fn env_var(&self) -> &'static str {
        match self {
            OptionKey::Enable => "INPUT_ENABLE",
            OptionKey::CheckLibrary => "INPUT_CHECK_LIBRARY",
            OptionKey::SkipPreprocessor => "INPUT_SKIP_PREPROCESSOR",
            OptionKey::InlineSuppression => "INPUT_INLINE_SUPPRESSION",
            OptionKey::Inconclusive => "INPUT_INCONCLUSIVE",
            OptionKey::Force => "INPUT_FORCE",
            OptionKey::ExcludeCheck => "INPUT_EXCLUDE_CHECK",
            OptionKey::ForceLanguage => "INPUT_FORCE_LANGUAGE",
            OptionKey::MaxCtuDepth => "INPUT_MAX_CTU_DEPTH",
            OptionKey::Platform => "INPUT_PLATFORM",
            OptionKey::Std => "INPUT_STD",
            OptionKey::OtherOptions => "INPUT_OTHER_OPTIONS",
            OptionKey::OutputFile => "INPUT_OUTPUT_FILE",
        }
    }
}

impl AnalyzerOptions {
    pub fn get(&self, key: OptionKey) -> &str {
        match key {
            OptionKey::Enable => &self.enable,
            OptionKey::CheckLibrary => &self.check_library,
            OptionKey::SkipPreprocessor => &self.skip_preprocessor,
            OptionKey::InlineSuppression => &self.inline_suppression,
            OptionKey::Inconclusive => &self.inconclusive,
            OptionKey::Force => &self.force,
            OptionKey::ExcludeCheck => &self.exclude_check,
            OptionKey::ForceLanguage => &self.force_language,
            OptionKey::MaxCtuDepth => &self.max_ctu_depth,
            OptionKey::Platform => &self.platform,
            OptionKey::Std => &self.std,
            OptionKey::OtherOptions => &self.other_options,
            OptionKey::OutputFile => &self.output_file,
        }
    }

    fn slot(&mut self, key: OptionKey) -> &mut String {
        match key {
            OptionKey::Enable => &mut self.enable,
            OptionKey::CheckLibrary => &mut self.check_library,
            OptionKey::SkipPreprocessor => &mut self.skip_preprocessor,
            OptionKey::InlineSuppression => &mut self.inline_suppression,
            OptionKey::Inconclusive => &mut self.inconclusive,
            OptionKey::Force => &mut self.force,
            OptionKey::ExcludeCheck => &mut self.exclude_check,
            OptionKey::ForceLanguage => &mut self.force_language,
            OptionKey::MaxCtuDepth => &mut self.max_ctu_depth,
            OptionKey::Platform => &mut self.platform,
            OptionKey::Std => &mut self.std,
            OptionKey::OtherOptions => &mut self.other_options,
            OptionKey::OutputFile => &mut self.output_file,
        }
    }

    pub fn set(&mut self, key: OptionKey, value: impl Into<String>) {
        *self.slot(key) = value.into();
    }

    /// Replace every option whose environment variable is set.
    pub fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in OptionKey::ALL {
            if let Some(value) = lookup(key.env_var()) {
                self.set(key, value);
            }
        }
    }

    /// The report path, or `None` when the report file is switched off.
    pub fn output_path(&self) -> Option<PathBuf> {
        let value = self.output_file.trim();
        if value.is_empty() || value == DISABLED {
            None
        } else {
            Some(PathBuf::from(value))
        }
    }

    /// Load option values from a TOML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Options file with every key documented, for `cppcheck-action config`.
    pub fn create_documented_config() -> String {
        format!(
            r#"# cppcheck-action options file
# Values set through INPUT_* environment variables take precedence over this file.
# "{disabled}" switches an option off, "{enabled}" switches a plain flag on.

# Comma separated check categories: all, information, missingInclude,
# performance, portability, style, unusedFunction, warning.
# Unknown names are ignored and "all" overrides the rest.
enable = "{all}"

# --check-library
check_library = "{disabled}"

# -E (print preprocessor output only)
skip_preprocessor = "{disabled}"

# --inline-suppr
inline_suppression = "{disabled}"

# --inconclusive (on unless set to "{disabled}")
inconclusive = "{enabled}"

# --force
force = "{disabled}"

# -i<path>: a file or directory to leave out of the analysis
exclude_check = "{disabled}"

# --language=<c|c++>
force_language = "{disabled}"

# --max-ctu-depth=<n>
max_ctu_depth = "{disabled}"

# --platform=<type>, e.g. unix64, win32A, native
platform = "{disabled}"

# --std=<standard>, e.g. c11, c++17
std = "{disabled}"

# Extra flags passed through as-is, e.g. "--suppress=missingIncludeSystem -DDEBUG"
other_options = "{disabled}"

# Where cppcheck writes its report; "{disabled}" keeps findings in the log only.
output_file = "{output}"
"#,
            disabled = DISABLED,
            enabled = ENABLED,
            all = CHECK_EVERYTHING,
            output = DEFAULT_OUTPUT_FILE,
        )
    }

    pub fn write_documented_config(path: &Path) -> Result<(), ConfigError> {
        let to_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_error)?;
        }
        std::fs::write(path, Self::create_documented_config()).map_err(to_error)
    }
}

/// Everything the run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github: GithubContext,
    pub target: TargetContext,
    pub options: AnalyzerOptions,
}

impl Config {
    /// Build from the process environment, layered over an optional options file.
    pub fn from_env(options_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(options_file, |key| env::var(key).ok())
    }

    /// Build from any key lookup. Defaults < options file < lookup values.
    pub fn from_lookup<F>(options_file: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVariable(key));

        let github = GithubContext {
            event_name: required("GITHUB_EVENT_NAME")?,
            repository: required("GITHUB_REPOSITORY")?,
            git_ref: required("GITHUB_REF")?,
            head_ref: required("GITHUB_HEAD_REF")?,
            base_ref: required("GITHUB_BASE_REF")?,
            actor: required("GITHUB_ACTOR")?,
            repository_owner: required("GITHUB_REPOSITORY_OWNER")?,
            token: Secret::new(required("INPUT_GITHUB_TOKEN")?),
        };

        let target_repository =
            lookup("INPUT_TARGET_REPOSITORY").unwrap_or_else(|| github.repository.clone());
        let pull_request_repository =
            lookup("INPUT_PULL_REQUEST_REPOSITORY").unwrap_or_else(|| target_repository.clone());
        let target_branch =
            lookup("INPUT_TARGET_BRANCH").unwrap_or_else(|| github.current_branch().to_string());
        let pull_request_branch =
            lookup("INPUT_PULL_REQUEST_BRANCH").unwrap_or_else(|| github.base_ref.clone());

        let mut options = match options_file {
            Some(path) => AnalyzerOptions::from_file(path)?,
            None => AnalyzerOptions::default(),
        };
        options.apply_overrides(&lookup);

        Ok(Self {
            github,
            target: TargetContext {
                target_repository,
                pull_request_repository,
                target_branch,
                pull_request_branch,
            },
            options,
        })
    }

    pub fn is_pull_request(&self) -> bool {
        self.github.event_name == PULL_REQUEST_EVENT
    }

    /// Pull requests opened by anyone but the repository owner are not analyzed.
    pub fn is_unauthorized_pull_request(&self) -> bool {
        self.is_pull_request() && self.github.actor != self.github.repository_owner
    }

    pub fn repository(&self) -> &str {
        if self.is_pull_request() {
            &self.target.pull_request_repository
        } else {
            &self.target.target_repository
        }
    }

    pub fn branch(&self) -> &str {
        if self.is_pull_request() {
            &self.target.pull_request_branch
        } else {
            &self.target.target_branch
        }
    }
}

impl GithubContext {
    /// Head ref on pull requests, otherwise the last path segment of the ref.
    pub fn current_branch(&self) -> &str {
        if !self.head_ref.is_empty() {
            return &self.head_ref;
        }
        self.git_ref.rsplit('/').next().unwrap_or(&self.git_ref)
    }
}
