//! # Termreel
//!
//! A scripted terminal typing animation engine.
//!
//! Termreel plays a fixed script of prompt, command, and output segments onto
//! a rendering surface one character at a time, the way a terminal session
//! looks when someone types into it. It is useful for hero banners, docs
//! walkthroughs, and reproducible terminal demos.
//!
//! The engine never blocks. Each step does one unit of work (one character,
//! one line break, or one segment boundary) and schedules the next through a
//! [`Scheduler`]. A surface can only ever be animated once; later starts on the
//! same surface are silently ignored.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::rc::Rc;
//! use std::time::Duration;
//! use termreel::{AnimationSegment, Engine, LocalScheduler, TerminalSurface};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let script = vec![
//!         AnimationSegment::prompt("$ "),
//!         AnimationSegment::command("ls").with_char_delay(Duration::from_millis(50)),
//!         AnimationSegment::line_break(),
//!         AnimationSegment::output("a.txt").with_char_delay(Duration::from_millis(20)),
//!     ];
//!
//!     let local = tokio::task::LocalSet::new();
//!     local
//!         .run_until(async {
//!             let engine = Engine::new(Rc::new(LocalScheduler::new()));
//!             let surface = Rc::new(TerminalSurface::stdout());
//!             engine.start(Some(surface), script, Duration::from_millis(500));
//!         })
//!         .await;
//!     // The LocalSet resolves once the last step has run.
//!     local.await;
//! }
//! ```
//!
//! ## Testing with a virtual clock
//!
//! [`VirtualClock`] and [`BufferSurface`] let you drive a run without real
//! timers:
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use termreel::{AnimationSegment, BufferSurface, Engine, Phase, VirtualClock};
//!
//! let clock = Rc::new(VirtualClock::new());
//! let engine = Engine::new(clock.clone());
//! let surface = Rc::new(BufferSurface::new());
//!
//! let script = vec![AnimationSegment::prompt("$ "), AnimationSegment::command("ls")];
//! let run = engine.start(Some(surface.clone()), script, Duration::ZERO).unwrap();
//! clock.run_until_idle();
//!
//! assert_eq!(surface.text(), "$ ls");
//! assert_eq!(run.phase(), Phase::Completed);
//! ```
//!
//! ## Script files
//!
//! Use [`parse_str`] or [`parse_file`] to load a script:
//!
//! | Line | Description |
//! |------|-------------|
//! | `prompt "$ "` | Prompt segment |
//! | `command "ls" 50ms` | Command typed at 50 ms per character |
//! | `output "a.txt" 20ms` | Program output typed at 20 ms per character |
//! | `newline` | Hard line break |
//! | `# comment` | Full-line or inline comment |
//!
//! The per-character delay is optional; without it the kind's default from
//! [`Timing`] applies.
//!
//! ## Implementing a custom surface
//!
//! Implement [`Surface`] to animate onto something new:
//!
//! ```
//! use anyhow::Result;
//! use std::cell::RefCell;
//! use termreel::{AnimationGuard, RunId, SegmentKind, Surface};
//!
//! #[derive(Default)]
//! pub struct Shouting {
//!     text: RefCell<String>,
//!     guard: AnimationGuard,
//! }
//!
//! impl Surface for Shouting {
//!     fn guard(&self) -> &AnimationGuard { &self.guard }
//!     fn clear(&self) -> Result<()> { self.text.borrow_mut().clear(); Ok(()) }
//!     fn open_run(&self, _kind: SegmentKind) -> Result<RunId> { Ok(RunId(0)) }
//!     fn append_char(&self, _run: RunId, ch: char) -> Result<()> {
//!         self.text.borrow_mut().extend(ch.to_uppercase());
//!         Ok(())
//!     }
//!     fn close_run(&self, _run: RunId) -> Result<()> { Ok(()) }
//!     fn insert_line_break(&self) -> Result<()> {
//!         self.text.borrow_mut().push('\n');
//!         Ok(())
//!     }
//! }
//! ```

pub mod engine;
pub mod error;
pub mod hero;
pub mod parser;
pub mod scheduler;
pub mod segment;
pub mod surface;
pub mod surfaces;

pub use engine::{
    AnimationHandle, AnimationState, DEFAULT_INITIAL_DELAY, Engine, Phase, Step, Timing,
};
pub use error::AnimationError;
pub use parser::{parse_file, parse_str};
pub use scheduler::{LocalScheduler, Scheduler, Task, TaskHandle, VirtualClock};
pub use segment::{AnimationSegment, SegmentKind};
pub use surface::{AnimationGuard, RunId, Surface};
pub use surfaces::{BufferSurface, TerminalSurface};
