//! Compiler invocation assembly
//!
//! The compile command always has the shape
//! `<compiler> <flags...> <sources...> <output-flag> <artifact>`: flags
//! precede the sources and the output designation follows them, which every
//! gcc/clang-style driver accepts.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

use crate::config::BuildConfig;
use crate::sources::SourceSet;

/// One external process invocation: a program followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    /// Create a command line with no arguments
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// All tokens, program first
    pub fn tokens(&self) -> impl Iterator<Item = &OsStr> {
        std::iter::once(self.program.as_os_str()).chain(self.args.iter().map(OsString::as_os_str))
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let token = token.to_string_lossy();
            if token.is_empty() || token.contains(char::is_whitespace) {
                write!(f, "\"{}\"", token.replace('"', "\\\""))?;
            } else {
                f.write_str(&token)?;
            }
        }
        Ok(())
    }
}

/// Build the compiler command that turns `sources` into `output`.
pub fn assemble(config: &BuildConfig, sources: &SourceSet, output: &Path) -> CommandLine {
    CommandLine::new(&config.compiler)
        .with_args(&config.flags)
        .with_args(sources.iter().map(|p| p.as_os_str()))
        .arg(&config.output_flag)
        .arg(output)
}

/// Build the command that executes the produced artifact.
pub fn run_command(artifact: &Path, args: &[String]) -> CommandLine {
    CommandLine::new(artifact).with_args(args)
}
