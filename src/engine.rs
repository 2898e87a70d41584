use crate::error::AnimationError;
use crate::scheduler::Scheduler;
use crate::segment::{AnimationSegment, SegmentKind};
use crate::surface::{RunId, Surface};
use anyhow::Result;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Delay before the first character when the caller has no preference.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Pacing values for a run.
///
/// Character delays apply between characters of a segment without an explicit
/// override. The inter-line and inter-segment delays follow a line break and a
/// finished segment respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub prompt_delay: Duration,
    pub command_delay: Duration,
    pub output_delay: Duration,
    pub inter_line: Duration,
    pub inter_segment: Duration,
    /// Upper bound of a random extra delay added to every character.
    pub jitter: Duration,
    /// Whether per-segment character delays take precedence over the kind
    /// defaults. When off, every character uses its kind default.
    pub honor_overrides: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            prompt_delay: Duration::from_millis(30),
            command_delay: Duration::from_millis(30),
            output_delay: Duration::from_millis(30),
            inter_line: Duration::from_millis(100),
            inter_segment: Duration::from_millis(200),
            jitter: Duration::ZERO,
            honor_overrides: true,
        }
    }
}

impl Timing {
    /// Every delay zero, segment overrides included; the whole script renders
    /// as fast as the scheduler allows.
    pub fn instant() -> Self {
        Timing {
            prompt_delay: Duration::ZERO,
            command_delay: Duration::ZERO,
            output_delay: Duration::ZERO,
            inter_line: Duration::ZERO,
            inter_segment: Duration::ZERO,
            jitter: Duration::ZERO,
            honor_overrides: false,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Default per-character delay for a segment kind.
    pub fn default_char_delay(&self, kind: SegmentKind) -> Duration {
        match kind {
            SegmentKind::Prompt => self.prompt_delay,
            SegmentKind::Command => self.command_delay,
            SegmentKind::Output => self.output_delay,
            SegmentKind::LineBreak => self.inter_line,
        }
    }

    /// Delay after typing one character of `segment`: the segment's override if
    /// it has one and overrides are honored, else the kind default, plus jitter.
    ///
    /// Jitter is sampled with nanosecond resolution.
    pub fn char_delay(&self, segment: &AnimationSegment) -> Duration {
        let base = segment
            .char_delay()
            .filter(|_| self.honor_overrides)
            .unwrap_or_else(|| self.default_char_delay(segment.kind()));
        if self.jitter.is_zero() {
            return base;
        }
        let max = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        let extra = rand::thread_rng().gen_range(0..=max);
        base + Duration::from_nanos(extra)
    }
}

/// Lifecycle of a run. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// What the scheduler should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run the next step after this delay
    Continue(Duration),

    /// The run is over; schedule nothing
    Done,
}

/// Progress of one run through its script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    pub segment_index: usize,
    pub char_index: usize,
    pub open_run: Option<RunId>,
    pub phase: Phase,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationState {
    pub fn new() -> Self {
        AnimationState {
            segment_index: 0,
            char_index: 0,
            open_run: None,
            phase: Phase::Idle,
        }
    }

    /// Advance the run by one unit of work: one character, one line break, or
    /// one segment boundary.
    ///
    /// A surface that is detached, or that fails an operation, ends the run
    /// immediately without an error.
    pub fn step(
        &mut self,
        script: &[AnimationSegment],
        surface: &dyn Surface,
        timing: &Timing,
    ) -> Step {
        if self.phase == Phase::Completed {
            return Step::Done;
        }
        if !surface.is_attached() {
            debug!(segment = self.segment_index, "surface detached, abandoning animation");
            self.abandon();
            return Step::Done;
        }
        self.phase = Phase::Running;

        match self.advance(script, surface, timing) {
            Ok(step) => step,
            Err(err) => {
                warn!(segment = self.segment_index, "abandoning animation: {:#}", err);
                self.abandon();
                Step::Done
            }
        }
    }

    fn advance(
        &mut self,
        script: &[AnimationSegment],
        surface: &dyn Surface,
        timing: &Timing,
    ) -> Result<Step> {
        let Some(segment) = script.get(self.segment_index) else {
            self.phase = Phase::Completed;
            return Ok(Step::Done);
        };

        if segment.is_line_break() {
            surface.insert_line_break()?;
            if let Some(run) = self.open_run.take() {
                surface.close_run(run)?;
            }
            self.next_segment();
            return Ok(Step::Continue(timing.inter_line));
        }

        let run = match self.open_run {
            Some(run) => run,
            None => {
                let run = surface.open_run(segment.kind())?;
                trace!(%run, kind = %segment.kind(), "opened run");
                self.open_run = Some(run);
                run
            }
        };

        if let Some(&ch) = segment.chars().get(self.char_index) {
            surface.append_char(run, ch)?;
            self.char_index += 1;
            return Ok(Step::Continue(timing.char_delay(segment)));
        }

        self.open_run = None;
        surface.close_run(run)?;
        self.next_segment();
        Ok(Step::Continue(timing.inter_segment))
    }

    fn next_segment(&mut self) {
        self.segment_index += 1;
        self.char_index = 0;
    }

    fn abandon(&mut self) {
        self.open_run = None;
        self.phase = Phase::Completed;
    }
}

/// One run: the script, its surface, and the state that the scheduled steps share.
struct Run {
    script: Rc<[AnimationSegment]>,
    surface: Rc<dyn Surface>,
    timing: Timing,
    scheduler: Rc<dyn Scheduler>,
    state: RefCell<AnimationState>,
}

impl Run {
    fn schedule(run: &Rc<Run>, delay: Duration) {
        let next = Rc::clone(run);
        let handle = run
            .scheduler
            .after(delay, Box::new(move || Run::tick(&next)));
        trace!(task = handle.0, ?delay, "scheduled step");
    }

    fn tick(run: &Rc<Run>) {
        let step = run
            .state
            .borrow_mut()
            .step(&run.script, run.surface.as_ref(), &run.timing);
        match step {
            Step::Continue(delay) => Run::schedule(run, delay),
            Step::Done => debug!(segments = run.script.len(), "terminal animation completed"),
        }
    }
}

/// Observes a run started by [`Engine::start`].
#[derive(Clone)]
pub struct AnimationHandle {
    run: Rc<Run>,
}

impl AnimationHandle {
    pub fn phase(&self) -> Phase {
        self.run.state.borrow().phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase() == Phase::Completed
    }

    /// A snapshot of the run's current state.
    pub fn state(&self) -> AnimationState {
        self.run.state.borrow().clone()
    }
}

/// The typing animation engine.
///
/// An engine holds a scheduler and timing and can start runs on any number of
/// surfaces, at most one per surface.
pub struct Engine {
    scheduler: Rc<dyn Scheduler>,
    timing: Timing,
}

impl Engine {
    /// Create an engine with default timing.
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_timing(scheduler, Timing::default())
    }

    pub fn with_timing(scheduler: Rc<dyn Scheduler>, timing: Timing) -> Self {
        Engine { scheduler, timing }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Start animating `script` on `surface`, with the first character
    /// appearing after `initial_delay`.
    ///
    /// Returns `None` without doing anything if the surface is absent or
    /// detached, or if an animation was already started on it.
    pub fn start(
        &self,
        surface: Option<Rc<dyn Surface>>,
        script: impl Into<Rc<[AnimationSegment]>>,
        initial_delay: Duration,
    ) -> Option<AnimationHandle> {
        match self.try_start(surface, script, initial_delay) {
            Ok(handle) => Some(handle),
            Err(err) => {
                debug!("terminal animation not started: {}", err);
                None
            }
        }
    }

    /// Like [`start`](Self::start), but reports why a run was not started.
    pub fn try_start(
        &self,
        surface: Option<Rc<dyn Surface>>,
        script: impl Into<Rc<[AnimationSegment]>>,
        initial_delay: Duration,
    ) -> Result<AnimationHandle, AnimationError> {
        let surface = surface
            .filter(|surface| surface.is_attached())
            .ok_or(AnimationError::SurfaceUnavailable)?;
        if !surface.guard().try_set() {
            return Err(AnimationError::AlreadyStarted);
        }

        let run = Rc::new(Run {
            script: script.into(),
            surface,
            timing: self.timing.clone(),
            scheduler: Rc::clone(&self.scheduler),
            state: RefCell::new(AnimationState::new()),
        });

        // A surface that cannot be cleared still gets a run; its first step
        // will find the surface broken and end it.
        if let Err(err) = run.surface.clear() {
            warn!("failed to clear surface: {:#}", err);
        }
        debug!(segments = run.script.len(), ?initial_delay, "starting terminal animation");
        Run::schedule(&run, initial_delay);

        Ok(AnimationHandle { run })
    }
}
