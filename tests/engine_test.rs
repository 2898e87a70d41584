use anyhow::{Result, bail};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use termreel::{
    AnimationGuard, AnimationSegment, BufferSurface, Engine, Phase, RunId, SegmentKind, Surface,
    Timing, VirtualClock,
};

/// Wraps a [`BufferSurface`] and starts failing after a number of appends.
struct FailingSurface {
    inner: BufferSurface,
    appends_allowed: usize,
    appends: Cell<usize>,
    fail_clear: bool,
}

impl FailingSurface {
    fn new(appends_allowed: usize) -> Self {
        FailingSurface {
            inner: BufferSurface::new(),
            appends_allowed,
            appends: Cell::new(0),
            fail_clear: false,
        }
    }

    fn failing_clear() -> Self {
        FailingSurface {
            fail_clear: true,
            ..Self::new(usize::MAX)
        }
    }
}

impl Surface for FailingSurface {
    fn guard(&self) -> &AnimationGuard {
        self.inner.guard()
    }

    fn clear(&self) -> Result<()> {
        if self.fail_clear {
            bail!("clear failed");
        }
        self.inner.clear()
    }

    fn open_run(&self, kind: SegmentKind) -> Result<RunId> {
        self.inner.open_run(kind)
    }

    fn append_char(&self, run: RunId, ch: char) -> Result<()> {
        let attempt = self.appends.get() + 1;
        self.appends.set(attempt);
        if attempt > self.appends_allowed {
            bail!("write failed");
        }
        self.inner.append_char(run, ch)
    }

    fn close_run(&self, run: RunId) -> Result<()> {
        self.inner.close_run(run)
    }

    fn insert_line_break(&self) -> Result<()> {
        self.inner.insert_line_break()
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn ls_script() -> Vec<AnimationSegment> {
    vec![
        AnimationSegment::prompt("$ "),
        AnimationSegment::command("ls").with_char_delay(ms(50)),
        AnimationSegment::line_break(),
        AnimationSegment::output("a.txt").with_char_delay(ms(20)),
    ]
}

#[test]
fn test_ls_session() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    let handle = engine
        .start(Some(surface.clone()), ls_script(), ms(500))
        .expect("animation should start");
    clock.run_until_idle();

    assert_eq!(surface.text(), "$ ls\na.txt");
    assert_eq!(
        surface.runs(),
        vec![
            (SegmentKind::Prompt, "$ ".to_string()),
            (SegmentKind::Command, "ls".to_string()),
            (SegmentKind::Output, "a.txt".to_string()),
        ]
    );
    assert_eq!(
        surface.markup(),
        "<span class=\"terminal-prompt\">$ </span>\
         <span class=\"terminal-command\">ls</span><br>\
         <span class=\"terminal-output\">a.txt</span>"
    );
    assert_eq!(handle.phase(), Phase::Completed);
    assert_eq!(handle.state().open_run, None);
    assert_eq!(clock.pending(), 0);
    assert!(!surface.has_open_run());
}

#[test]
fn test_ls_session_timeline() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());
    engine.start(Some(surface.clone()), ls_script(), ms(500));

    // "$" at 500, " " at 530, prompt closes at 560, "l" at 760.
    clock.advance(ms(500));
    assert_eq!(surface.text(), "$");
    clock.advance(ms(30));
    assert_eq!(surface.text(), "$ ");
    clock.advance(ms(229));
    assert_eq!(surface.text(), "$ ");
    clock.advance(ms(1));
    assert_eq!(surface.text(), "$ l");
    clock.advance(ms(50));
    assert_eq!(surface.text(), "$ ls");
}

#[test]
fn test_line_break_only_script() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    let handle = engine
        .start(
            Some(surface.clone()),
            vec![AnimationSegment::line_break()],
            ms(0),
        )
        .unwrap();

    assert!(clock.run_next());
    assert_eq!(surface.line_breaks(), 1);
    assert!(surface.runs().is_empty());

    // The step after the break finds the script exhausted.
    assert!(clock.run_next());
    assert_eq!(handle.phase(), Phase::Completed);
    assert!(!clock.run_next());
    assert_eq!(surface.text(), "\n");
}

#[test]
fn test_second_start_is_ignored() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    assert!(engine.start(Some(surface.clone()), ls_script(), ms(500)).is_some());
    let scheduled = clock.scheduled();
    let mutations = surface.mutations();
    assert!(engine.start(Some(surface.clone()), ls_script(), ms(0)).is_none());
    assert_eq!(clock.scheduled(), scheduled);
    assert_eq!(surface.mutations(), mutations);

    clock.run_until_idle();
    assert_eq!(surface.text(), "$ ls\na.txt");
}

#[test]
fn test_second_start_after_completion_is_ignored() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    engine.start(Some(surface.clone()), ls_script(), ms(0));
    clock.run_until_idle();
    let other = vec![AnimationSegment::output("replaced")];
    assert!(engine.start(Some(surface.clone()), other, ms(0)).is_none());
    clock.run_until_idle();
    assert_eq!(surface.text(), "$ ls\na.txt");
}

#[test]
fn test_separate_engines_share_the_surface_guard() {
    let clock = Rc::new(VirtualClock::new());
    let first = Engine::new(clock.clone());
    let second = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    assert!(first.start(Some(surface.clone()), ls_script(), ms(0)).is_some());
    assert!(second.start(Some(surface.clone()), ls_script(), ms(0)).is_none());
}

#[test]
fn test_independent_surfaces_animate_independently() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::with_timing(clock.clone(), Timing::instant());
    let a = Rc::new(BufferSurface::new());
    let b = Rc::new(BufferSurface::new());

    engine.start(Some(a.clone()), vec![AnimationSegment::output("aa")], ms(0));
    engine.start(Some(b.clone()), vec![AnimationSegment::output("bb")], ms(0));
    clock.run_until_idle();

    assert_eq!(a.text(), "aa");
    assert_eq!(b.text(), "bb");
}

#[test]
fn test_absent_surface_does_nothing() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());

    assert!(engine.start(None, ls_script(), ms(500)).is_none());
    assert_eq!(clock.scheduled(), 0);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn test_surface_removed_mid_run() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());

    let handle = engine
        .start(Some(surface.clone()), ls_script(), ms(500))
        .unwrap();
    clock.advance(ms(500));
    assert_eq!(surface.text(), "$");

    surface.detach();
    clock.run_until_idle();

    assert_eq!(handle.phase(), Phase::Completed);
    assert_eq!(handle.state().open_run, None);
    assert_eq!(surface.text(), "$");
    assert_eq!(clock.pending(), 0);
}

#[test]
fn test_one_outstanding_step_at_a_time() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());
    engine.start(Some(surface.clone()), ls_script(), ms(500));

    while clock.pending() > 0 {
        assert_eq!(clock.pending(), 1);
        clock.run_next();
    }
}

#[test]
fn test_phase_moves_forward_only() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(BufferSurface::new());
    let handle = engine
        .start(Some(surface.clone()), ls_script(), ms(10))
        .unwrap();

    let mut last = handle.phase();
    assert_eq!(last, Phase::Idle);
    while clock.run_next() {
        let phase = handle.phase();
        assert!(phase >= last);
        let state = handle.state();
        if state.open_run.is_some() {
            assert_eq!(phase, Phase::Running);
        }
        last = phase;
    }
    assert_eq!(last, Phase::Completed);
}

#[test]
fn test_guard_is_per_surface_instance() {
    let surface = BufferSurface::new();
    assert!(!surface.guard().is_set());
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let shared = Rc::new(surface);
    engine.start(Some(shared.clone()), ls_script(), ms(0));
    assert!(shared.guard().is_set());
    assert!(!BufferSurface::new().guard().is_set());
}

#[test]
fn test_failing_append_abandons_run() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::new(clock.clone());
    let surface = Rc::new(FailingSurface::new(1));

    let handle = engine
        .start(Some(surface.clone()), ls_script(), ms(0))
        .unwrap();
    clock.run_until_idle();

    assert_eq!(handle.phase(), Phase::Completed);
    assert_eq!(handle.state().open_run, None);
    assert_eq!(clock.pending(), 0);
    // The first append succeeded, the second failed, nothing was tried after.
    assert_eq!(surface.appends.get(), 2);
    assert_eq!(surface.inner.text(), "$");
}

#[test]
fn test_failing_clear_still_runs() {
    let clock = Rc::new(VirtualClock::new());
    let engine = Engine::with_timing(clock.clone(), Timing::instant());
    let surface = Rc::new(FailingSurface::failing_clear());
    surface.inner.insert_line_break().unwrap();

    let handle = engine
        .start(Some(surface.clone()), ls_script(), ms(0))
        .expect("a clear failure does not block the run");
    assert!(surface.guard().is_set());
    clock.run_until_idle();

    assert_eq!(handle.phase(), Phase::Completed);
    assert_eq!(surface.inner.text(), "\n$ ls\na.txt");
    assert_eq!(clock.pending(), 0);
}
