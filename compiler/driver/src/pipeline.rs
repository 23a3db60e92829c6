//! The compilation pipeline.
//!
//! Parsing, semantic analysis and lowering report into the engine of the session
//! and never abort on their own. After lowering, the diagnostics are displayed and
//! the pipeline stops if any error was filed. Only then is code generated.

use crate::BuildMode;
use diagnostics::{
    Class, Diagnostic,
    error::{ErasedReportedError, Result},
    render,
};
use session::Session;
use std::{
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use utility::{
    QuoteExt,
    paint::{AnsiColor, epaint, paint},
};

/// The extension of the generated assembly file.
pub const OUTPUT_EXTENSION: &str = "fasm";

pub struct Pipeline<'a> {
    mode: BuildMode,
    path: &'a Path,
    session: &'a Session,
    timings: Vec<(&'static str, Duration)>,
}

impl<'a> Pipeline<'a> {
    pub fn new(mode: BuildMode, path: &'a Path, session: &'a Session) -> Self {
        Self { mode, path, session, timings: Vec::new() }
    }

    /// Compile the file at the path of the pipeline.
    ///
    /// Returns the path of the written assembly file in build mode.
    pub fn run(mut self) -> Result<Option<PathBuf>> {
        let session = self.session;
        let engine = session.engine();
        let path = self.path;
        let options = session.options();

        log::debug!("{} ‘{}’", self.mode.name(), path.display());

        let root = session.map().next_index();

        let tree = self.time("parsing", || parser::parse_program(path, session));
        let mut tree = match tree {
            Ok(tree) => tree,
            Err(error) => {
                self.display();
                self.fail();
                return Err(error);
            }
        };

        if options.unstable.emit_tokens {
            // The parser has already filed the lexical diagnostics of the root file.
            let point = engine.create_restoration_point();
            let tokens = lexer::lex(&session.file(root), root, engine).bare;
            engine.load_restoration_point(point);

            for token in &tokens {
                eprintln!("{:?} {}", token.span, lexer::Source(&token.bare));
            }
        }

        let analysis_failed = self.time("semantic analysis", || {
            analyzer::analyze(&mut tree, session) || engine.errors_encountered()
        });

        if options.unstable.emit_tree {
            eprint!("{}", tree.pretty_print(tree.root()));
        }

        log::debug!("lowering");
        lowerer::lower(&mut tree, session);

        if options.unstable.emit_lowered_tree {
            eprint!("{}", tree.pretty_print(tree.root()));
        }

        session.attributes().report_unused(engine);

        self.display();

        // Unused attributes might have been escalated to errors.
        if analysis_failed || engine.errors_encountered() {
            self.fail();
            return Err(ErasedReportedError::new_unchecked());
        }

        let output = match self.mode {
            BuildMode::Check => {
                self.succeed(format_args!("checked {}", path.display().quote()));
                return Ok(None);
            }
            BuildMode::Build => path.with_extension(OUTPUT_EXTENSION),
        };

        let module = self.time("code generation", || codegen::generate(&tree, session, path));

        if let Err(error) = std::fs::write(&output, module.to_string()) {
            let diagnostic = Diagnostic::error()
                .class(Class::Io)
                .message(format!("could not write the output file {}", output.display().quote()))
                .note(error.to_string())
                .untagged();

            // The diagnostics have already been displayed at this point.
            if let Err(error) = epaint(|painter| render(&diagnostic, None, painter), options.color) {
                log::error!("could not display a diagnostic: {error}");
            }
            engine.throw(diagnostic);

            self.fail();
            return Err(ErasedReportedError::new_unchecked());
        }

        self.succeed(format_args!(
            "compiled {} to {}",
            path.display().quote(),
            output.display().quote(),
        ));

        Ok(Some(output))
    }

    fn time<T>(&mut self, title: &'static str, pass: impl FnOnce() -> T) -> T {
        log::debug!("{title}");

        let time = Instant::now();
        let result = pass();
        let duration = time.elapsed();

        log::debug!("finished {title} in {duration:?}");
        self.timings.push((title, duration));

        result
    }

    fn display(&self) {
        if let Err(error) = self.session.engine().display_to_stderr() {
            log::error!("could not display the diagnostics: {error}");
        }
    }

    fn fail(&self) {
        let result = epaint(
            |painter| {
                painter.set(AnsiColor::Red.on_default().bold())?;
                write!(painter, "compilation of {} failed", self.path.display().quote())?;
                painter.unset()?;
                writeln!(painter)
            },
            self.session.options().color,
        );

        if let Err(error) = result {
            log::error!("could not print the status: {error}");
        }

        self.report_timings();
    }

    fn succeed(&self, message: std::fmt::Arguments<'_>) {
        if self.session.options().quiet {
            return;
        }

        let result = paint(
            |painter| {
                painter.set(AnsiColor::Green.on_default().bold())?;
                write!(painter, "{message}")?;
                painter.unset()?;
                writeln!(painter)
            },
            self.session.options().color,
        );

        if let Err(error) = result {
            log::error!("could not print the status: {error}");
        }

        self.report_timings();
    }

    fn report_timings(&self) {
        if self.session.options().quiet {
            return;
        }

        for (title, duration) in &self.timings {
            println!("  {title:<30}{duration:?}");
        }
    }
}
