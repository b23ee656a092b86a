//! The fixed-step loop driver.
//!
//! [`GameLoop`] runs the simulation at a target wall-clock duration per step
//! (33 ms by default). Each iteration polls input, broadcasts the step event,
//! resolves the world, draws, and then sleeps off the remaining frame budget.
//! Sleep overshoot is measured and carried into the next iteration's budget
//! so pacing drift does not accumulate; a frame that overruns its budget is
//! tolerated silently and the carried adjustment resets.
//!
//! The loop is strictly single-threaded and cooperative: the only way to end
//! [`GameLoop::run`] is the game-over flag on [`LoopControl`], observed at
//! the top of each iteration, never mid-frame.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::backend::{DrawBackend, InputSource};
use crate::event::GameEvent;
use crate::world::World;

/// Default target frame time (about 30 steps per second).
pub const FRAME_TIME_DEFAULT: Duration = Duration::from_millis(33);

// =============================================================================
// FrameClock
// =============================================================================

/// Monotonic interval timer for frame pacing.
///
/// Two reads exist: [`delta`](Self::delta) returns the elapsed time *and*
/// resets the baseline; [`split`](Self::split) returns the elapsed time
/// without touching it.
#[derive(Debug, Clone)]
pub struct FrameClock {
    prev: Instant,
}

impl FrameClock {
    /// Creates a clock with its baseline at now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prev: Instant::now(),
        }
    }

    /// Moves the baseline to now.
    pub fn reset(&mut self) {
        self.prev = Instant::now();
    }

    /// Returns time elapsed since the baseline and resets it.
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.prev);
        self.prev = now;
        elapsed
    }

    /// Returns time elapsed since the baseline without resetting it.
    #[must_use]
    pub fn split(&self) -> Duration {
        self.prev.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// LoopControl
// =============================================================================

/// Cooperative cancellation flag for the loop.
///
/// Handed to entity behaviors through the
/// [`EngineContext`](crate::world::EngineContext), so any event handler may
/// end the run. The flag is only observed at the top of a loop iteration.
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    game_over: bool,
}

impl LoopControl {
    /// Creates a control with the game-over flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the game-over flag.
    pub fn set_game_over(&mut self, game_over: bool) {
        self.game_over = game_over;
    }

    /// Returns the game-over flag.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }
}

// =============================================================================
// GameLoop
// =============================================================================

/// Fixed-step scheduler driving a [`World`] through discrete simulation
/// steps.
///
/// The loop has two states, stopped and running. [`start_up`](Self::start_up)
/// transitions stopped → running exactly once (further calls are no-ops) and
/// clears the game-over flag; [`shut_down`](Self::shut_down) transitions back
/// unconditionally. [`run`](Self::run) does nothing unless started.
pub struct GameLoop {
    started: bool,
    control: LoopControl,
    frame_time: Duration,
    step_count: u64,
}

impl GameLoop {
    /// Creates a stopped loop with the default frame time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_time(FRAME_TIME_DEFAULT)
    }

    /// Creates a stopped loop with a custom target frame time.
    #[must_use]
    pub fn with_frame_time(frame_time: Duration) -> Self {
        Self {
            started: false,
            control: LoopControl { game_over: true },
            frame_time,
            step_count: 0,
        }
    }

    /// Transitions stopped → running and clears the game-over flag.
    /// Idempotent: calling on a running loop changes nothing.
    pub fn start_up(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.control.set_game_over(false);
        info!("game loop started");
    }

    /// Transitions to stopped unconditionally and raises the game-over flag.
    pub fn shut_down(&mut self) {
        self.started = false;
        self.control.set_game_over(true);
        info!("game loop shut down");
    }

    /// Returns `true` while the loop is started.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Returns the target frame time.
    #[must_use]
    pub const fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// Returns the number of completed steps.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Sets or clears the game-over flag from outside the loop.
    pub fn set_game_over(&mut self, game_over: bool) {
        self.control.set_game_over(game_over);
    }

    /// Returns mutable access to the loop control, for driving the world
    /// manually without `run` (tests, custom schedulers).
    pub fn control_mut(&mut self) -> &mut LoopControl {
        &mut self.control
    }

    /// Runs the loop until an event handler raises the game-over flag.
    ///
    /// Per iteration:
    /// 1. reset the frame clock;
    /// 2. poll `input` and broadcast each resulting event to all live
    ///    entities;
    /// 3. broadcast the step event to a snapshot of the live-set;
    /// 4. resolve the world (movement, collisions, deferred deletion);
    /// 5. draw in altitude order, then swap buffers;
    /// 6. sleep off the remaining frame budget, carrying sleep overshoot
    ///    into the next iteration;
    /// 7. increment the step counter.
    ///
    /// A no-op when the loop has not been started.
    pub fn run(
        &mut self,
        world: &mut World,
        input: &mut dyn InputSource,
        backend: &mut dyn DrawBackend,
    ) {
        if !self.started {
            return;
        }

        info!(frame_time = ?self.frame_time, "game loop running");

        let mut clock = FrameClock::new();
        let mut adjust = Duration::ZERO;

        while !self.control.is_game_over() {
            clock.reset();

            for input_event in input.poll() {
                let event: GameEvent = input_event.into();
                world.broadcast(&event, &mut self.control);
            }

            let step = GameEvent::Step {
                count: self.step_count,
            };
            world.broadcast(&step, &mut self.control);

            world.update(&mut self.control);

            world.draw(backend);
            if let Err(err) = backend.swap_buffers() {
                warn!(%err, "buffer swap failed");
            }

            let loop_time = clock.split();
            let intended = self
                .frame_time
                .saturating_sub(loop_time)
                .saturating_sub(adjust);
            if intended > Duration::ZERO {
                clock.reset();
                thread::sleep(intended);
                let actual = clock.split();
                // Oversleep is carried forward; undersleep is not possible
                // with std sleep, but saturate anyway.
                adjust = actual.saturating_sub(intended);
            } else {
                // Frame overran its budget; no catch-up is attempted.
                adjust = Duration::ZERO;
            }

            self.step_count += 1;
        }

        info!(steps = self.step_count, "game loop ended");
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("started", &self.started)
            .field("game_over", &self.control.is_game_over())
            .field("frame_time", &self.frame_time)
            .field("step_count", &self.step_count)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
