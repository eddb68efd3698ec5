use crate::command::CompiledCommand;
use std::process::{Command, Output};
use tracing::{error, info, warn};

/// First output line cppcheck prints when none of the given paths exist.
pub const NO_INPUT_SENTINEL: &str = "could not find or open any of the paths given.";

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ANALYZER_FAILED: i32 = 1;
    /// EX_UNAVAILABLE: the analyzer binary could not be started.
    pub const LAUNCH_FAILED: i32 = 69;
    /// EX_NOPERM: pull request from someone other than the repository owner.
    pub const SKIPPED_UNAUTHORIZED: i32 = 77;
    /// EX_CONFIG: required configuration is missing or unreadable.
    pub const CONFIG_ERROR: i32 = 78;
}

/// How an analyzer run ended, from the wrapper's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Analyzer exited zero; findings (if any) were relayed.
    Clean,
    /// Analyzer exited zero but found no source files to scan.
    NoInput,
    /// Analyzer exited non-zero.
    AnalyzerFailed { code: Option<i32> },
    /// Analyzer could not be started at all.
    LaunchFailed,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::AnalyzerFailed { .. } | Outcome::LaunchFailed)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Clean | Outcome::NoInput => exit_codes::SUCCESS,
            Outcome::AnalyzerFailed { .. } => exit_codes::ANALYZER_FAILED,
            Outcome::LaunchFailed => exit_codes::LAUNCH_FAILED,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    pub show_version: bool,
    pub show_help: bool,
}

impl Executor {
    pub fn new(show_version: bool, show_help: bool) -> Self {
        Self {
            show_version,
            show_help,
        }
    }

    /// Run the analyzer once against `target` and classify the result.
    pub fn run(&self, compiled: CompiledCommand, target: &str) -> Outcome {
        let CompiledCommand {
            mut vector,
            output_file,
        } = compiled;

        if self.show_version {
            info!("checking version");
            self.query(vector.program(), "--version");
        }
        if self.show_help {
            self.query(vector.program(), "--help");
        }

        if let Some(path) = output_file {
            vector.push(format!("--output-file={}", path.display()));
        }
        vector.push(target);

        info!("--------------------------------------");
        info!("given command: {}", vector);

        let output = match Command::new(vector.program()).args(vector.args()).output() {
            Ok(output) => output,
            Err(e) => {
                error!("failed to launch {}: {}", vector.program(), e);
                return Outcome::LaunchFailed;
            }
        };

        classify(&output, target)
    }

    /// Run a diagnostic query such as `--version` and log what it prints.
    fn query(&self, program: &str, flag: &str) {
        match Command::new(program).arg(flag).output() {
            Ok(output) => {
                log_lines(&String::from_utf8_lossy(&output.stdout));
                log_lines(&String::from_utf8_lossy(&output.stderr));
            }
            Err(e) => warn!("could not run {} {}: {}", program, flag, e),
        }
    }
}

fn classify(output: &Output, target: &str) -> Outcome {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        let code = output.status.code();
        match code {
            Some(code) => error!("analyzer exited with status {}", code),
            None => error!("analyzer was terminated by a signal"),
        }
        log_lines(&stdout);
        log_block("analyzer stderr", &stderr);
        return Outcome::AnalyzerFailed { code };
    }

    if is_no_input(&stdout) {
        warn!("no source files found under {}", target);
        return Outcome::NoInput;
    }

    log_lines(&stdout);
    log_block("analyzer stderr", &stderr);
    Outcome::Clean
}

/// True when the first line of output is the "no paths resolved" message,
/// with or without the analyzer's own `cppcheck: error:` style prefix.
pub fn is_no_input(stdout: &str) -> bool {
    stdout
        .lines()
        .next()
        .map(|line| line.trim().ends_with(NO_INPUT_SENTINEL))
        .unwrap_or(false)
}

fn log_lines(text: &str) {
    for line in text.lines() {
        info!("{}", line);
    }
}

fn log_block(title: &str, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    info!("---- {} ----", title);
    log_lines(text);
    info!("---- end of {} ----", title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{compile, CommandVector};
    use crate::config::{AnalyzerOptions, OptionKey, DISABLED};
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    /// Writes an executable shell script standing in for cppcheck.
    #[cfg(unix)]
    fn fake_analyzer(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("fake-cppcheck");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn compiled_for(program: &Path, output_file: Option<&str>) -> CompiledCommand {
        let mut options = AnalyzerOptions::default();
        options.set(OptionKey::OutputFile, output_file.unwrap_or(DISABLED));
        compile(&program.to_string_lossy(), &options)
    }

    #[test]
    fn test_no_input_detection() {
        assert!(is_no_input("could not find or open any of the paths given.\n"));
        assert!(is_no_input(
            "cppcheck: error: could not find or open any of the paths given.\nmore"
        ));
        assert!(!is_no_input("Checking main.c ...\n"));
        assert!(!is_no_input(""));
        assert!(!is_no_input("ok\ncould not find or open any of the paths given."));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Clean.exit_code(), 0);
        assert_eq!(Outcome::NoInput.exit_code(), 0);
        assert!(!Outcome::NoInput.is_failure());
        assert_eq!(Outcome::AnalyzerFailed { code: Some(3) }.exit_code(), 1);
        assert_eq!(Outcome::LaunchFailed.exit_code(), 69);
        assert!(Outcome::LaunchFailed.is_failure());
    }

    #[test]
    fn test_missing_binary_is_launch_failure() {
        let compiled = CompiledCommand {
            vector: CommandVector::new("/nonexistent/definitely-not-cppcheck"),
            output_file: None,
        };
        let outcome = Executor::new(true, true).run(compiled, ".");
        assert_eq!(outcome, Outcome::LaunchFailed);
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_run() {
        let dir = tempdir().unwrap();
        let program = fake_analyzer(
            &dir,
            "echo 'Checking main.c ...'\necho 'main.c:3: style' >&2",
        );
        let outcome = Executor::default().run(compiled_for(&program, None), ".");
        assert_eq!(outcome, Outcome::Clean);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_analyzer_failure() {
        let dir = tempdir().unwrap();
        let program = fake_analyzer(&dir, "echo 'bad option'\nexit 3");
        let outcome = Executor::default().run(compiled_for(&program, None), ".");
        assert_eq!(outcome, Outcome::AnalyzerFailed { code: Some(3) });
    }

    #[cfg(unix)]
    #[test]
    fn test_no_input_sentinel_is_not_a_failure() {
        let dir = tempdir().unwrap();
        let program = fake_analyzer(
            &dir,
            "echo 'could not find or open any of the paths given.'\nexit 0",
        );
        let outcome = Executor::default().run(compiled_for(&program, None), "missing/");
        assert_eq!(outcome, Outcome::NoInput);
        assert!(!outcome.is_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_file_and_target_are_appended_last() {
        let dir = tempdir().unwrap();
        let args_log = dir.path().join("args.txt");
        let program = fake_analyzer(
            &dir,
            &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done", args_log.display()),
        );

        let outcome = Executor::default().run(compiled_for(&program, Some("report.txt")), "src");
        assert_eq!(outcome, Outcome::Clean);

        let args = std::fs::read_to_string(&args_log).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(
            args,
            vec!["--enable=all", "--inconclusive", "--output-file=report.txt", "src"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_no_output_flag_without_report_path() {
        let dir = tempdir().unwrap();
        let args_log = dir.path().join("args.txt");
        let program = fake_analyzer(
            &dir,
            &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done", args_log.display()),
        );

        Executor::default().run(compiled_for(&program, None), ".");

        let args = std::fs::read_to_string(&args_log).unwrap();
        assert!(!args.contains("--output-file"));
        assert_eq!(args.lines().last(), Some("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_version_and_help_are_queried_separately() {
        let dir = tempdir().unwrap();
        let calls = dir.path().join("calls.txt");
        let program = fake_analyzer(&dir, &format!("echo \"$1\" >> '{}'", calls.display()));

        Executor::new(true, true).run(compiled_for(&program, None), ".");

        let calls = std::fs::read_to_string(&calls).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls, vec!["--version", "--help", "--enable=all"]);
    }
}
