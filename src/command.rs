use crate::checks::CheckSelection;
use crate::config::{AnalyzerOptions, OptionKey, DISABLED, ENABLED};
use std::fmt;
use std::path::PathBuf;

pub const ANALYZER: &str = "cppcheck";

/// Separator between extra flags in the free-form passthrough option.
pub const PASSTHROUGH_SEP: &str = " -";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Equals(&'static str),
    NotEquals(&'static str),
}

impl Trigger {
    pub fn fires(&self, value: &str) -> bool {
        match self {
            Trigger::Equals(sentinel) => value == *sentinel,
            Trigger::NotEquals(sentinel) => value != *sentinel,
        }
    }
}

/// How one option turns into command line tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    /// A fixed token, emitted when the trigger fires.
    Constant { when: Trigger, token: &'static str },
    /// A template with one `{}` slot for the raw value, emitted unless disabled.
    Parametrized { template: &'static str },
    /// Free-form extra flags, split on [`PASSTHROUGH_SEP`].
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub option: OptionKey,
    pub rule: FlagRule,
}

const fn constant(option: OptionKey, when: Trigger, token: &'static str) -> FlagSpec {
    FlagSpec {
        option,
        rule: FlagRule::Constant { when, token },
    }
}

const fn parametrized(option: OptionKey, template: &'static str) -> FlagSpec {
    FlagSpec {
        option,
        rule: FlagRule::Parametrized { template },
    }
}

/// Emission order of everything after `--enable=`.
pub const FLAG_TABLE: &[FlagSpec] = &[
    constant(OptionKey::CheckLibrary, Trigger::Equals(ENABLED), "--check-library"),
    constant(OptionKey::SkipPreprocessor, Trigger::Equals(ENABLED), "-E"),
    constant(OptionKey::InlineSuppression, Trigger::Equals(ENABLED), "--inline-suppr"),
    constant(OptionKey::Inconclusive, Trigger::NotEquals(DISABLED), "--inconclusive"),
    constant(OptionKey::Force, Trigger::Equals(ENABLED), "--force"),
    parametrized(OptionKey::ExcludeCheck, "-i{}"),
    parametrized(OptionKey::ForceLanguage, "--language={}"),
    parametrized(OptionKey::MaxCtuDepth, "--max-ctu-depth={}"),
    parametrized(OptionKey::Platform, "--platform={}"),
    parametrized(OptionKey::Std, "--std={}"),
    FlagSpec {
        option: OptionKey::OtherOptions,
        rule: FlagRule::Passthrough,
    },
];

impl FlagRule {
    /// Tokens this rule contributes for `value`; empty when it contributes nothing.
    pub fn tokens(&self, value: &str) -> Vec<String> {
        match self {
            FlagRule::Constant { when, token } => {
                if when.fires(value) {
                    vec![token.to_string()]
                } else {
                    Vec::new()
                }
            }
            FlagRule::Parametrized { template } => {
                if is_off(value) {
                    Vec::new()
                } else {
                    vec![template.replacen("{}", value, 1)]
                }
            }
            FlagRule::Passthrough => {
                if is_off(value) {
                    Vec::new()
                } else {
                    split_passthrough(value)
                }
            }
        }
    }
}

/// Blank values count as disabled so `--std=` is never emitted bare.
fn is_off(value: &str) -> bool {
    value == DISABLED || value.trim().is_empty()
}

/// Split `"-a --b=c"` into `["-a", "--b=c"]`.
///
/// The first piece is kept as written; every later piece gets back the dash the
/// separator consumed.
pub fn split_passthrough(value: &str) -> Vec<String> {
    let mut pieces = value.trim().split(PASSTHROUGH_SEP);
    let mut tokens = Vec::new();

    if let Some(first) = pieces.next() {
        let first = first.trim();
        if !first.is_empty() {
            tokens.push(first.to_string());
        }
    }
    for piece in pieces {
        let piece = piece.trim();
        if !piece.is_empty() {
            tokens.push(format!("-{}", piece));
        }
    }

    tokens
}

/// Ordered argv for the analyzer, starting with the executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVector {
    tokens: Vec<String>,
}

impl CommandVector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// A compiled vector plus the report path the executor should add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCommand {
    pub vector: CommandVector,
    pub output_file: Option<PathBuf>,
}

/// Compile options into a command for the given executable. Never fails.
pub fn compile(program: &str, options: &AnalyzerOptions) -> CompiledCommand {
    let mut vector = CommandVector::new(program);
    vector.push(CheckSelection::parse(&options.enable).to_flag());

    for spec in FLAG_TABLE {
        for token in spec.rule.tokens(options.get(spec.option)) {
            vector.push(token);
        }
    }

    CompiledCommand {
        vector,
        output_file: options.output_path(),
    }
}
