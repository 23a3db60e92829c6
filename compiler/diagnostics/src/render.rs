//! The textual representation of diagnostics.
//!
//! ```text
//! lib.food:3:9: error[undefined-name]: the name ‘y’ is not defined
//!     var x: int = 1;
//!     x = x + y;
//! ~~~~~~~~~~~~^
//! note: names have to be declared before they are used
//! ```
//!
//! The context window consists of up to three lines ending at the line of the
//! diagnostic. The caret line marks the column.

use crate::{Severity, Subseverity, UntaggedDiagnostic};
use span::SourceMap;
use std::io::{self, Write};
use utility::paint::{AnsiColor, Effects, Painter, Style};

#[cfg(test)]
mod test;

const CONTEXT_LINES: u32 = 3;

mod palette {
    use utility::paint::AnsiColor;

    pub(super) const INFO: AnsiColor = AnsiColor::BrightCyan;
    pub(super) const WARNING: AnsiColor = AnsiColor::BrightYellow;
    pub(super) const ERROR: AnsiColor = AnsiColor::BrightRed;
    pub(super) const FATAL: AnsiColor = AnsiColor::BrightMagenta;
    pub(super) const NOTE: AnsiColor = AnsiColor::BrightBlue;
    pub(super) const HELP: AnsiColor = AnsiColor::BrightGreen;
    pub(super) const FRAME: AnsiColor = AnsiColor::BrightBlack;
}

impl Severity {
    fn color(self) -> AnsiColor {
        match self {
            Self::Info => palette::INFO,
            Self::Warning => palette::WARNING,
            Self::Error => palette::ERROR,
            Self::Fatal => palette::FATAL,
        }
    }
}

impl Subseverity {
    fn color(self) -> AnsiColor {
        match self {
            Self::Note => palette::NOTE,
            Self::Help => palette::HELP,
        }
    }
}

/// Render a single diagnostic.
///
/// Without a source map or a location only the header and the subdiagnostics are rendered.
pub fn render(
    diagnostic: &UntaggedDiagnostic,
    map: Option<&SourceMap>,
    painter: &mut Painter,
) -> io::Result<()> {
    let source = diagnostic
        .location
        .zip(map)
        .and_then(|(location, map)| Some((location, map.get(location.file)?)));

    let position = source.map(|(location, file)| (file, file.position(location.span.start)));

    if let Some((file, position)) = position {
        painter.set(Effects::BOLD)?;
        write!(painter, "{}:{position}: ", file.name())?;
        painter.unset()?;
    }

    render_header(diagnostic, painter)?;

    if let Some((file, position)) = position {
        let first = position.line.saturating_sub(CONTEXT_LINES - 1).max(1);

        painter.set(palette::FRAME)?;
        for number in first..=position.line {
            if let Some(line) = file.line(number) {
                writeln!(painter, "{line}")?;
            }
        }
        painter.unset()?;

        let padding = position.column.saturating_sub(1) as usize;
        painter.set(Style::new().fg_color(Some(diagnostic.severity.color().into())))?;
        writeln!(painter, "{}^", "~".repeat(padding))?;
        painter.unset()?;
    }

    for subdiagnostic in &diagnostic.subdiagnostics {
        painter.set(subdiagnostic.severity.color().on_default().effects(Effects::BOLD))?;
        write!(painter, "{}", subdiagnostic.severity.name())?;
        painter.unset()?;
        writeln!(painter, ": {}", subdiagnostic.message)?;
    }

    Ok(())
}

fn render_header(diagnostic: &UntaggedDiagnostic, painter: &mut Painter) -> io::Result<()> {
    let color = diagnostic.severity.color();

    painter.set(color.on_default().effects(Effects::BOLD))?;
    write!(painter, "{}", diagnostic.severity.name())?;
    if !diagnostic.class.is_empty() {
        write!(painter, "[{}]", diagnostic.class)?;
    }
    painter.unset()?;

    painter.set(Effects::BOLD)?;
    write!(painter, ": {}", diagnostic.message)?;
    painter.unset()?;

    writeln!(painter)
}
