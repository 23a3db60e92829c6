//! Styled output to the terminal or into a buffer.
//!
//! Styles are pushed and popped with [`Painter::set`] and [`Painter::unset`].
//! When colors are disabled both are no-ops, so renderers never need to
//! special-case plain output.

use crate::SmallVec;
use derivation::{Elements, FromStr, Str};
use std::io::{self, BufWriter, StderrLock, StdoutLock, Write};
use supports_color::Stream;

pub use anstyle::{AnsiColor, Effects, Style};

/// Paint into a `String`.
pub fn paint_to_string(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> String {
    let mut painter = Painter::bytes(choice);
    // Writing into a byte buffer cannot fail and painters only ever emit UTF-8.
    let _ = paint(&mut painter);
    String::from_utf8_lossy(&painter.into_buffer()).into_owned()
}

/// Paint to locked and buffered stdout.
pub fn paint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stdout(choice);
    paint(&mut painter)?;
    painter.flush()
}

/// Paint to locked and buffered stderr.
pub fn epaint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stderr(choice);
    paint(&mut painter)?;
    painter.flush()
}

pub struct Painter {
    writer: Writer,
    colorize: bool,
    stack: SmallVec<Style, 3>,
}

impl Painter {
    pub fn bytes(choice: ColorChoice) -> Self {
        Self::new(Writer::Bytes(Vec::new()), choice.resolve(None))
    }

    pub fn stdout(choice: ColorChoice) -> Self {
        let writer = Writer::Stdout(BufWriter::new(io::stdout().lock()));

        Self::new(writer, choice.resolve(Some(Stream::Stdout)))
    }

    pub fn stderr(choice: ColorChoice) -> Self {
        let writer = Writer::Stderr(BufWriter::new(io::stderr().lock()));

        Self::new(writer, choice.resolve(Some(Stream::Stderr)))
    }

    fn new(writer: Writer, colorize: bool) -> Self {
        Self {
            writer,
            colorize,
            stack: SmallVec::new(),
        }
    }

    pub fn set(&mut self, style: impl IntoStyle) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        let style = style.into_style();
        self.stack.push(style);
        write!(self.writer, "{}", style.render())
    }

    pub fn unset(&mut self) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        if let Some(style) = self.stack.pop() {
            write!(self.writer, "{}", style.render_reset())?;
        }

        // Restore the styles that are still in effect.
        for style in &self.stack {
            write!(self.writer, "{}", style.render())?;
        }

        Ok(())
    }

    /// Write `text` in the given style.
    pub fn paint(&mut self, style: impl IntoStyle, text: impl std::fmt::Display) -> io::Result<()> {
        self.set(style)?;
        write!(self, "{text}")?;
        self.unset()
    }

    /// The painted bytes if this painter writes into a buffer.
    pub fn into_buffer(self) -> Vec<u8> {
        match self.writer {
            Writer::Bytes(bytes) => bytes,
            Writer::Stdout(_) | Writer::Stderr(_) => Vec::new(),
        }
    }
}

impl Write for Painter {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.writer.write(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

enum Writer {
    Stdout(BufWriter<StdoutLock<'static>>),
    Stderr(BufWriter<StderrLock<'static>>),
    Bytes(Vec<u8>),
}

impl Write for Writer {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buffer),
            Self::Stderr(stderr) => stderr.write(buffer),
            Self::Bytes(bytes) => bytes.write(buffer),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::Stderr(stderr) => stderr.flush(),
            Self::Bytes(bytes) => bytes.flush(),
        }
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, FromStr, Str, Elements)]
#[format(dash_case)]
pub enum ColorChoice {
    #[default]
    Auto,
    Never,
    Always,
}

impl ColorChoice {
    fn resolve(self, stream: Option<Stream>) -> bool {
        match (self, stream) {
            (Self::Auto, Some(stream)) => {
                supports_color::on_cached(stream).is_some_and(|level| level.has_basic)
            }
            (Self::Never, _) | (Self::Auto, None) => false,
            (Self::Always, _) => true,
        }
    }
}

pub trait IntoStyle {
    fn into_style(self) -> Style;
}

impl IntoStyle for Style {
    fn into_style(self) -> Style {
        self
    }
}

impl IntoStyle for AnsiColor {
    fn into_style(self) -> Style {
        self.on_default()
    }
}

impl IntoStyle for Effects {
    fn into_style(self) -> Style {
        Style::new().effects(self)
    }
}
