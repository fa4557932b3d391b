//! Terminal styling for CLI output
//!
//! Colors are applied through `owo-colors`, which skips them when the stream
//! is not a TTY or `NO_COLOR` is set.

use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::{self, Display};

/// Semantic tone of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Repository names, counts, links
    Accent,
    /// Completed work
    Success,
    /// Failures
    Error,
    /// Skipped or degraded results
    Warn,
    /// Secondary detail
    Muted,
    /// Headers
    Emphasis,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Accent => Style::new().cyan(),
            Self::Success => Style::new().green(),
            Self::Error => Style::new().red(),
            Self::Warn => Style::new().yellow(),
            Self::Muted => Style::new().dimmed(),
            Self::Emphasis => Style::new().bold(),
        }
    }

    const fn stream(self) -> Stream {
        match self {
            Self::Error => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A value rendered with a [`Tone`]
pub struct Painted<T> {
    value: T,
    tone: Tone,
}

impl<T: Display> Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.tone.style();
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(self.tone.stream(), |v| v.style(style))
        )
    }
}

/// Extension trait painting any displayable value
pub trait Paint: Display {
    /// Render with the given tone
    fn tone(&self, tone: Tone) -> Painted<&Self> {
        Painted { value: self, tone }
    }

    /// Cyan
    fn accent(&self) -> Painted<&Self> {
        self.tone(Tone::Accent)
    }

    /// Green
    fn success(&self) -> Painted<&Self> {
        self.tone(Tone::Success)
    }

    /// Red, stderr
    fn error(&self) -> Painted<&Self> {
        self.tone(Tone::Error)
    }

    /// Yellow
    fn warn(&self) -> Painted<&Self> {
        self.tone(Tone::Warn)
    }

    /// Dim
    fn muted(&self) -> Painted<&Self> {
        self.tone(Tone::Muted)
    }

    /// Bold
    fn emphasis(&self) -> Painted<&Self> {
        self.tone(Tone::Emphasis)
    }
}

impl<T: Display + ?Sized> Paint for T {}

/// Green checkmark
pub fn check() -> Painted<&'static str> {
    "✓".tone(Tone::Success)
}

/// Red cross
pub fn cross() -> Painted<&'static str> {
    "✗".tone(Tone::Error)
}

/// Dim dash for skipped entries
pub fn dash() -> Painted<&'static str> {
    "-".tone(Tone::Muted)
}
