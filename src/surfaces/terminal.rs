//! [`TerminalSurface`] — types the animation onto a terminal with ANSI styling.

use crate::segment::SegmentKind;
use crate::surface::{AnimationGuard, RunId, Surface};
use anyhow::{Result, anyhow};
use std::cell::{Cell, RefCell};
use std::io::{self, Stdout, Write};

const RESET: &str = "\x1B[0m";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

fn style(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Prompt => "\x1B[1;32m",
        SegmentKind::Command => "\x1B[1;37m",
        SegmentKind::Output => "\x1B[2m",
        SegmentKind::LineBreak => "",
    }
}

/// Writes each character to `W` as soon as it is appended, flushing every time
/// so the typing is visible.
pub struct TerminalSurface<W: Write> {
    writer: RefCell<W>,
    color: bool,
    clear_screen: bool,
    next_run: Cell<u64>,
    open: Cell<Option<RunId>>,
    guard: AnimationGuard,
}

impl TerminalSurface<Stdout> {
    /// A surface on the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Create a surface with colors enabled and screen clearing on `clear`.
    pub fn new(writer: W) -> Self {
        TerminalSurface {
            writer: RefCell::new(writer),
            color: true,
            clear_screen: true,
            next_run: Cell::new(0),
            open: Cell::new(None),
            guard: AnimationGuard::new(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Whether [`Surface::clear`] erases the screen. When disabled, clearing
    /// only resets styling.
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Consume the surface and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write(&self, data: &str) -> Result<()> {
        let mut writer = self.writer.borrow_mut();
        writer.write_all(data.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn ensure_open(&self, run: RunId) -> Result<()> {
        if self.open.get() != Some(run) {
            return Err(anyhow!("{} is not open", run));
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn guard(&self) -> &AnimationGuard {
        &self.guard
    }

    fn clear(&self) -> Result<()> {
        self.open.set(None);
        match (self.clear_screen, self.color) {
            (true, _) => self.write(CLEAR_SCREEN),
            (false, true) => self.write(RESET),
            (false, false) => Ok(()),
        }
    }

    fn open_run(&self, kind: SegmentKind) -> Result<RunId> {
        if let Some(run) = self.open.get() {
            return Err(anyhow!("{} is still open", run));
        }
        let id = RunId(self.next_run.get());
        self.next_run.set(id.0 + 1);
        if self.color {
            self.write(style(kind))?;
        }
        self.open.set(Some(id));
        Ok(id)
    }

    fn append_char(&self, run: RunId, ch: char) -> Result<()> {
        self.ensure_open(run)?;
        let mut buf = [0u8; 4];
        self.write(ch.encode_utf8(&mut buf))
    }

    fn close_run(&self, run: RunId) -> Result<()> {
        self.ensure_open(run)?;
        self.open.set(None);
        if self.color {
            self.write(RESET)?;
        }
        Ok(())
    }

    fn insert_line_break(&self) -> Result<()> {
        self.write("\n")
    }
}
