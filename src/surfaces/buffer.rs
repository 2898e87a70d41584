//! [`BufferSurface`] — accumulates the animation in memory.

use crate::segment::SegmentKind;
use crate::surface::{AnimationGuard, RunId, Surface};
use anyhow::{Result, anyhow};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone)]
enum Node {
    Run {
        id: RunId,
        kind: SegmentKind,
        text: String,
        closed: bool,
    },
    LineBreak,
}

#[derive(Debug, Default)]
struct Content {
    nodes: Vec<Node>,
    next_run: u64,
    mutations: usize,
}

impl Content {
    fn run_mut(&mut self, run: RunId) -> Result<(&mut String, &mut bool)> {
        self.nodes
            .iter_mut()
            .find_map(|node| match node {
                Node::Run {
                    id, text, closed, ..
                } if *id == run => Some((text, closed)),
                _ => None,
            })
            .ok_or_else(|| anyhow!("Unknown {}", run))
    }
}

/// An in-memory surface that records every run and line break.
///
/// Handy as a test double and for rendering the animation to markup. Call
/// [`detach`](Self::detach) to simulate the surface disappearing mid-run.
#[derive(Debug)]
pub struct BufferSurface {
    content: RefCell<Content>,
    attached: Cell<bool>,
    guard: AnimationGuard,
}

impl BufferSurface {
    pub fn new() -> Self {
        BufferSurface {
            content: RefCell::new(Content::default()),
            attached: Cell::new(true),
            guard: AnimationGuard::new(),
        }
    }

    /// Mark the surface as gone. Later steps of a running animation abandon it.
    pub fn detach(&self) {
        self.attached.set(false);
    }

    /// The rendered text: every appended character, with `\n` for each line break.
    pub fn text(&self) -> String {
        let content = self.content.borrow();
        let mut out = String::new();
        for node in &content.nodes {
            match node {
                Node::Run { text, .. } => out.push_str(text),
                Node::LineBreak => out.push('\n'),
            }
        }
        out
    }

    /// Render as HTML-like markup, tagging each run with `terminal-<kind>`.
    pub fn markup(&self) -> String {
        let content = self.content.borrow();
        let mut out = String::new();
        for node in &content.nodes {
            match node {
                Node::Run { kind, text, .. } => {
                    out.push_str(&format!(
                        "<span class=\"terminal-{}\">{}</span>",
                        kind, text
                    ));
                }
                Node::LineBreak => out.push_str("<br>"),
            }
        }
        out
    }

    /// Every run opened so far, in order, with its kind and text.
    pub fn runs(&self) -> Vec<(SegmentKind, String)> {
        self.content
            .borrow()
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Run { kind, text, .. } => Some((*kind, text.clone())),
                Node::LineBreak => None,
            })
            .collect()
    }

    pub fn line_breaks(&self) -> usize {
        self.content
            .borrow()
            .nodes
            .iter()
            .filter(|node| matches!(node, Node::LineBreak))
            .count()
    }

    /// Whether a run is still open.
    pub fn has_open_run(&self) -> bool {
        self.content
            .borrow()
            .nodes
            .iter()
            .any(|node| matches!(node, Node::Run { closed: false, .. }))
    }

    /// Number of mutating calls received, including `clear`.
    pub fn mutations(&self) -> usize {
        self.content.borrow().mutations
    }
}

impl Default for BufferSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for BufferSurface {
    fn guard(&self) -> &AnimationGuard {
        &self.guard
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn clear(&self) -> Result<()> {
        let mut content = self.content.borrow_mut();
        content.nodes.clear();
        content.mutations += 1;
        Ok(())
    }

    fn open_run(&self, kind: SegmentKind) -> Result<RunId> {
        let mut content = self.content.borrow_mut();
        let id = RunId(content.next_run);
        content.next_run += 1;
        content.nodes.push(Node::Run {
            id,
            kind,
            text: String::new(),
            closed: false,
        });
        content.mutations += 1;
        Ok(id)
    }

    fn append_char(&self, run: RunId, ch: char) -> Result<()> {
        let mut content = self.content.borrow_mut();
        let (text, closed) = content.run_mut(run)?;
        if *closed {
            return Err(anyhow!("Cannot append to closed {}", run));
        }
        text.push(ch);
        content.mutations += 1;
        Ok(())
    }

    fn close_run(&self, run: RunId) -> Result<()> {
        let mut content = self.content.borrow_mut();
        let (_, closed) = content.run_mut(run)?;
        *closed = true;
        content.mutations += 1;
        Ok(())
    }

    fn insert_line_break(&self) -> Result<()> {
        let mut content = self.content.borrow_mut();
        content.nodes.push(Node::LineBreak);
        content.mutations += 1;
        Ok(())
    }
}
