//! Build orchestration
//!
//! Drives the two flows the tool offers:
//!
//! ```text
//! clean:          Idle → Cleaning → Done
//! build and run:  Idle → Locating → Assembling → Compiling
//!                      → CompileFailed
//!                      → Running → RunFailed | Done
//! ```
//!
//! Every failure ends the flow. The build directory is only created once
//! sources have been found, so an empty source tree leaves the filesystem
//! untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::artifact::{self, CleanReport, Platform};
use crate::config::BuildConfig;
use crate::error::{hints, BuildError};
use crate::exec::{command_exists, ExecutionResult, ProcessRunner};
use crate::invocation;
use crate::sources;
use crate::utils::terminal::{create_spinner, print_info, print_rule, print_success, print_verbose};

/// Where the orchestrator is in its flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Cleaning,
    Locating,
    Assembling,
    Compiling,
    CompileFailed,
    Running,
    RunFailed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Cleaning => "cleaning",
            Stage::Locating => "locating",
            Stage::Assembling => "assembling",
            Stage::Compiling => "compiling",
            Stage::CompileFailed => "compile failed",
            Stage::Running => "running",
            Stage::RunFailed => "run failed",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Sequences source discovery, compilation and execution
pub struct Orchestrator<R: ProcessRunner> {
    config: BuildConfig,
    runner: R,
    platform: Platform,
    verbose: bool,
    stage: Stage,
}

impl<R: ProcessRunner> Orchestrator<R> {
    /// Create an orchestrator for the host platform
    pub fn new(config: BuildConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            platform: Platform::host(),
            verbose: false,
            stage: Stage::Idle,
        }
    }

    /// Name artifacts for `platform` instead of the host
    #[cfg(test)]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Echo stage transitions and command lines
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Last stage entered; after a failure, the stage that failed
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Where the compiler writes the artifact
    pub fn artifact_path(&self) -> PathBuf {
        artifact::resolve_artifact_path(
            &self.config.build_path(),
            &self.config.target_name,
            self.platform,
        )
    }

    fn enter(&mut self, stage: Stage) {
        print_verbose(self.verbose, &format!("[{} → {}]", self.stage, stage));
        self.stage = stage;
    }

    /// Remove the build directory
    pub fn clean(&mut self, dry_run: bool) -> Result<CleanReport, BuildError> {
        self.enter(Stage::Cleaning);
        let report = artifact::clean(&self.config.build_path(), dry_run)?;
        self.enter(Stage::Done);
        Ok(report)
    }

    /// Compile all sources into the artifact without running it
    pub fn build(&mut self) -> Result<PathBuf, BuildError> {
        let artifact = self.compile()?;
        self.enter(Stage::Done);
        Ok(artifact)
    }

    /// Compile, then run the artifact with `args`
    pub fn build_and_run(&mut self, args: &[String]) -> Result<ExecutionResult, BuildError> {
        let artifact = self.compile()?;
        self.run(&artifact, args)
    }

    fn compile(&mut self) -> Result<PathBuf, BuildError> {
        self.enter(Stage::Locating);
        let source_root = self.config.source_root();
        let spinner = create_spinner(&format!(
            "Scanning {} for {} files...",
            self.config.source_dir.display(),
            self.config.extension
        ));
        let found = sources::discover(&source_root, &self.config.extension, self.verbose);
        spinner.finish_and_clear();
        let sources = found?;

        print_info(&format!(
            "Found {} source file(s): {}",
            sources.len(),
            sources.display_names(&source_root).join(", ")
        ));

        self.enter(Stage::Assembling);
        let build_path = self.config.build_path();
        artifact::ensure(&build_path)?;
        let artifact = self.artifact_path();
        let command = invocation::assemble(&self.config, &sources, &artifact);

        self.enter(Stage::Compiling);
        print_info(&format!("Compiling {}...", self.config.target_name));
        if self.verbose {
            if let Ok(path) = which::which(&self.config.compiler) {
                print_verbose(true, &format!("Using compiler {}", path.display()));
            }
        }
        print_verbose(self.verbose, &command.to_string());

        let result = match self.runner.execute(&command, &self.config.project_root) {
            Ok(result) => result,
            Err(BuildError::Launch {
                program,
                source,
                hint: None,
            }) if !command_exists(&self.config.compiler) => {
                return Err(BuildError::Launch {
                    hint: Some(hints::missing_compiler(&program)),
                    program,
                    source,
                })
            }
            Err(e) => return Err(e),
        };

        if !result.success() {
            self.enter(Stage::CompileFailed);
            return Err(BuildError::CompileFailed {
                status: result.status,
            });
        }

        print_success(&format!(
            "Compiled {} in {:.2}s",
            artifact.display(),
            result.duration.as_secs_f64()
        ));
        Ok(artifact)
    }

    /// Execute a previously built artifact
    pub fn run(
        &mut self,
        artifact: &Path,
        args: &[String],
    ) -> Result<ExecutionResult, BuildError> {
        self.enter(Stage::Running);
        let command = invocation::run_command(artifact, args);

        print_info(&format!("Running {}", artifact.display()));
        print_verbose(self.verbose, &command.to_string());
        print_rule();
        let outcome = self.runner.execute(&command, &self.config.project_root);
        print_rule();
        let result = outcome?;

        if !result.success() {
            self.enter(Stage::RunFailed);
            return Err(BuildError::RunFailed {
                artifact: artifact.to_path_buf(),
                status: result.status,
            });
        }

        self.enter(Stage::Done);
        print_success(&format!("{} finished", self.config.target_name));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::time::Duration;

    use super::*;
    use crate::exec::ExecutionStatus;
    use crate::invocation::CommandLine;
    use tempfile::TempDir;

    /// Records every command and replays canned outcomes
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<CommandLine>>,
        outcomes: RefCell<VecDeque<Result<ExecutionResult, BuildError>>>,
    }

    impl FakeRunner {
        fn with_statuses(statuses: &[ExecutionStatus]) -> Self {
            let runner = Self::default();
            for status in statuses {
                runner.outcomes.borrow_mut().push_back(Ok(ExecutionResult {
                    status: *status,
                    duration: Duration::from_millis(5),
                }));
            }
            runner
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn execute(
            &self,
            command: &CommandLine,
            _working_dir: &Path,
        ) -> Result<ExecutionResult, BuildError> {
            self.calls.borrow_mut().push(command.clone());
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("unexpected process invocation")
        }
    }

    fn project(files: &[&str]) -> (TempDir, BuildConfig) {
        let temp_dir = TempDir::new().unwrap();
        for rel in files {
            let path = temp_dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "int main() { return 0; }\n").unwrap();
        }
        let config = BuildConfig {
            compiler: "fake-cxx".to_string(),
            flags: vec!["-x".to_string()],
            ..BuildConfig::for_project(temp_dir.path())
        };
        (temp_dir, config)
    }

    fn tokens(command: &CommandLine) -> Vec<String> {
        command
            .tokens()
            .map(|t| t.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_build_and_run_success() {
        let (temp_dir, config) = project(&["src/a.cpp", "src/b/c.cpp"]);
        let runner = FakeRunner::with_statuses(&[ExecutionStatus::Success, ExecutionStatus::Success]);
        let mut orchestrator = Orchestrator::new(config, &runner).with_platform(Platform::Unix);

        orchestrator.build_and_run(&[]).unwrap();
        assert_eq!(orchestrator.stage(), Stage::Done);

        let root = temp_dir.path();
        let artifact = root.join("build").join("manc");
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            tokens(&calls[0]),
            vec![
                "fake-cxx".to_string(),
                "-x".to_string(),
                root.join("src").join("a.cpp").display().to_string(),
                root.join("src").join("b").join("c.cpp").display().to_string(),
                "-o".to_string(),
                artifact.display().to_string(),
            ]
        );
        assert_eq!(tokens(&calls[1]), vec![artifact.display().to_string()]);
        assert!(root.join("build").is_dir());
    }

    #[test]
    fn test_empty_source_tree_never_invokes_runner() {
        let (temp_dir, config) = project(&["src/README.md"]);
        let runner = FakeRunner::default();
        let mut orchestrator = Orchestrator::new(config, &runner);

        let err = orchestrator.build_and_run(&[]).unwrap_err();
        assert!(matches!(err, BuildError::NoSourcesFound { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_SOURCES);
        assert_eq!(runner.call_count(), 0);
        assert!(!temp_dir.path().join("build").exists());
    }

    #[test]
    fn test_compile_failure_skips_run() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::with_statuses(&[ExecutionStatus::NonZeroExit(2)]);
        let mut orchestrator = Orchestrator::new(config, &runner);

        let err = orchestrator.build_and_run(&[]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::CompileFailed {
                status: ExecutionStatus::NonZeroExit(2)
            }
        ));
        assert_ne!(err.exit_code(), 0);
        assert_eq!(orchestrator.stage(), Stage::CompileFailed);
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_run_failure_is_reported() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::with_statuses(&[
            ExecutionStatus::Success,
            ExecutionStatus::NonZeroExit(1),
        ]);
        let mut orchestrator = Orchestrator::new(config, &runner);

        let err = orchestrator.build_and_run(&[]).unwrap_err();
        assert!(matches!(err, BuildError::RunFailed { .. }));
        assert_eq!(orchestrator.stage(), Stage::RunFailed);
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn test_run_timeout_is_a_run_failure() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::with_statuses(&[
            ExecutionStatus::Success,
            ExecutionStatus::TimedOut(Duration::from_secs(1)),
        ]);
        let mut orchestrator = Orchestrator::new(config, &runner);

        let err = orchestrator.build_and_run(&[]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::RunFailed {
                status: ExecutionStatus::TimedOut(_),
                ..
            }
        ));
        assert_eq!(err.exit_code(), 5);
        assert_eq!(orchestrator.stage(), Stage::RunFailed);
    }

    #[test]
    fn test_run_forwards_arguments() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::with_statuses(&[ExecutionStatus::Success, ExecutionStatus::Success]);
        let mut orchestrator = Orchestrator::new(config, &runner).with_platform(Platform::Unix);

        let args = vec!["--dump".to_string(), "input.sy".to_string()];
        orchestrator.build_and_run(&args).unwrap();

        let calls = runner.calls.borrow();
        let run_tokens = tokens(&calls[1]);
        assert_eq!(&run_tokens[1..], &["--dump", "input.sy"]);
    }

    #[test]
    fn test_build_only_compiles_once() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::with_statuses(&[ExecutionStatus::Success]);
        let mut orchestrator = Orchestrator::new(config, &runner).with_platform(Platform::Windows);

        let artifact = orchestrator.build().unwrap();
        assert_eq!(artifact.file_name().unwrap(), "manc.exe");
        assert_eq!(orchestrator.stage(), Stage::Done);
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_missing_compiler_gets_hint() {
        let (_temp_dir, config) = project(&["src/main.cpp"]);
        let runner = FakeRunner::default();
        runner
            .outcomes
            .borrow_mut()
            .push_back(Err(BuildError::launch("fake-cxx", None)));
        let mut orchestrator = Orchestrator::new(config, &runner);

        let err = orchestrator.build_and_run(&[]).unwrap_err();
        match err {
            BuildError::Launch { hint, .. } => assert!(hint.unwrap().contains("fake-cxx")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_clean_twice() {
        let (temp_dir, config) = project(&["src/main.cpp", "build/manc"]);
        let runner = FakeRunner::default();
        let mut orchestrator = Orchestrator::new(config, &runner);

        let first = orchestrator.clean(false).unwrap();
        assert!(matches!(first, CleanReport::Removed { .. }));
        assert_eq!(orchestrator.stage(), Stage::Done);

        let second = orchestrator.clean(false).unwrap();
        assert_eq!(second, CleanReport::Absent);
        assert!(temp_dir.path().join("src").join("main.cpp").exists());
        assert_eq!(runner.call_count(), 0);
    }
}
