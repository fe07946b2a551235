//! Configuration of reporter output, such as colorization and style.

use clap::ValueEnum;
use owo_colors::Style;

/// Specifies whether to colorize output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Colorize if the stream is a terminal that supports it and `NO_COLOR` is not set.
    #[default]
    Auto,

    /// Always colorize, even if `NO_COLOR` is set.
    Always,

    /// Never colorize.
    Never,
}

impl Color {
    /// Determines whether output should be colorized based on whether the given stream supports
    /// this.
    pub fn should_colorize(self, stream: supports_color::Stream) -> bool {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        self.resolve(no_color, || supports_color::on_cached(stream).is_some())
    }

    fn resolve(self, no_color: bool, stream_supports: impl FnOnce() -> bool) -> bool {
        match self {
            Color::Auto => !no_color && stream_supports(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// The closed set of colors the reporter uses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AnsiColor {
    /// The terminal's own foreground color.
    #[default]
    Default,
    Red,
    Green,
    Yellow,
}

/// Severity of a line written to the output. Each level has a default color.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputLevel {
    Information,
    Warning,
    Error,
}

impl OutputLevel {
    pub fn color(self) -> AnsiColor {
        match self {
            OutputLevel::Information => AnsiColor::Default,
            OutputLevel::Warning => AnsiColor::Yellow,
            OutputLevel::Error => AnsiColor::Red,
        }
    }
}

/// Maps colors to styles. Every style is plain until [`colorize`](Self::colorize) is called,
/// so uncolored output has exactly the same text with no escapes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Styles {
    red: Style,
    green: Style,
    yellow: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.red = Style::new().red();
        self.green = Style::new().green();
        self.yellow = Style::new().yellow();
    }

    pub(crate) fn style(&self, color: AnsiColor) -> Style {
        match color {
            AnsiColor::Default => Style::new(),
            AnsiColor::Red => self.red,
            AnsiColor::Green => self.green,
            AnsiColor::Yellow => self.yellow,
        }
    }
}
