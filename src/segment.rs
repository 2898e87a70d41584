use std::fmt;
use std::time::Duration;

/// The role a segment plays in the simulated terminal session.
///
/// Surfaces use the kind to style the run that holds the segment's characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Shell prompt, e.g. `$ `
    Prompt,

    /// Text the simulated user types
    Command,

    /// Text the simulated program prints
    Output,

    /// Hard line break; never typed character by character
    LineBreak,
}

impl SegmentKind {
    /// The script keyword for this kind, also used as the styling tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Prompt => "prompt",
            SegmentKind::Command => "command",
            SegmentKind::Output => "output",
            SegmentKind::LineBreak => "newline",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic unit of an animation script.
///
/// Segments are immutable once built. A [`SegmentKind::LineBreak`] segment
/// never carries text; the constructors make it impossible to build one that does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSegment {
    kind: SegmentKind,
    text: Vec<char>,
    char_delay: Option<Duration>,
}

impl AnimationSegment {
    /// Create a Prompt segment typed with the default prompt delay
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::typed(SegmentKind::Prompt, text)
    }

    /// Create a Command segment typed with the default command delay
    pub fn command(text: impl Into<String>) -> Self {
        Self::typed(SegmentKind::Command, text)
    }

    /// Create an Output segment typed with the default output delay
    pub fn output(text: impl Into<String>) -> Self {
        Self::typed(SegmentKind::Output, text)
    }

    /// Create a LineBreak segment
    pub fn line_break() -> Self {
        AnimationSegment {
            kind: SegmentKind::LineBreak,
            text: Vec::new(),
            char_delay: None,
        }
    }

    fn typed(kind: SegmentKind, text: impl Into<String>) -> Self {
        AnimationSegment {
            kind,
            text: text.into().chars().collect(),
            char_delay: None,
        }
    }

    /// Override the per-character delay for this segment.
    ///
    /// A zero delay is treated as no override. Line breaks ignore the override
    /// since they are not typed.
    pub fn with_char_delay(mut self, delay: Duration) -> Self {
        if self.kind != SegmentKind::LineBreak && !delay.is_zero() {
            self.char_delay = Some(delay);
        }
        self
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// The characters to type, in order.
    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn char_delay(&self) -> Option<Duration> {
        self.char_delay
    }

    pub fn is_line_break(&self) -> bool {
        self.kind == SegmentKind::LineBreak
    }
}
