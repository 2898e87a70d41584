//! The built-in hero script and the lifecycle hook that plays it.
//!
//! The hook runs once the host has finished its own setup: it waits
//! [`SETUP_DELAY`], then starts the animation on whatever surface the host
//! found. Firing the hook more than once is harmless; the surface's guard lets
//! only the first run through.

use crate::engine::{AnimationHandle, DEFAULT_INITIAL_DELAY, Engine};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::segment::AnimationSegment;
use crate::surface::Surface;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Time the hook waits after setup before starting the animation.
pub const SETUP_DELAY: Duration = Duration::from_millis(100);

const COMMAND_DELAY: Duration = Duration::from_millis(50);
const OUTPUT_DELAY: Duration = Duration::from_millis(20);

/// A `mkunit` session creating and installing a user service.
pub fn hero_script() -> Vec<AnimationSegment> {
    vec![
        AnimationSegment::prompt("$ "),
        AnimationSegment::command(
            "mkunit service myapp --exec \"./server\" --restart on-failure --install",
        )
        .with_char_delay(COMMAND_DELAY),
        AnimationSegment::line_break(),
        AnimationSegment::output("Created myapp.service").with_char_delay(OUTPUT_DELAY),
        AnimationSegment::line_break(),
        AnimationSegment::output("Installed to ~/.config/systemd/user/myapp.service")
            .with_char_delay(OUTPUT_DELAY),
        AnimationSegment::line_break(),
        AnimationSegment::output("Run: systemctl --user start myapp")
            .with_char_delay(OUTPUT_DELAY),
    ]
}

/// Start the hero animation on `surface` right away.
pub fn init_terminal_animation(
    engine: &Engine,
    surface: Option<Rc<dyn Surface>>,
) -> Option<AnimationHandle> {
    engine.start(surface, hero_script(), DEFAULT_INITIAL_DELAY)
}

/// Schedule `script` to start on `surface` once setup has settled.
pub fn on_ready(
    engine: &Rc<Engine>,
    scheduler: &dyn Scheduler,
    surface: Option<Rc<dyn Surface>>,
    script: Rc<[AnimationSegment]>,
    initial_delay: Duration,
) -> TaskHandle {
    let engine = Rc::clone(engine);
    scheduler.after(
        SETUP_DELAY,
        Box::new(move || {
            if engine.start(surface, script, initial_delay).is_none() {
                debug!("lifecycle hook fired without starting an animation");
            }
        }),
    )
}
