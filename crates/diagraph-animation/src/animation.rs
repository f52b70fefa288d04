//! The tween state machine itself.
//!
//! Status enum, curve application, and listener registries follow this
//! workspace's established single-threaded idiom: `Rc`/`RefCell` instead
//! of `Arc`/`Mutex`, and driven by [`diagraph_scheduler::Scheduler`]
//! rather than a platform vsync ticker. The host supplies "now" via an
//! injected clock closure (no wall-clock reads inside the
//! engine), which is also what makes this deterministically testable —
//! tests drive a fake clock and call `scheduler.run_frame()` themselves.

use crate::params::{lerp_params, ParamVector};
use crate::timing::Timing;
use diagraph_scheduler::{Priority, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;

/// Where an [`Animation`] currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    /// Constructed but never started, or completed/stopped/cancelled and
    /// not yet restarted.
    Idle,
    Running,
    /// Ran to completion on its own (non-infinite mode only).
    Completed,
    /// Halted before completion, either synchronously via
    /// [`Animation::stop`] or asynchronously via [`Animation::cancel`].
    Cancelled,
}

struct State {
    from: ParamVector,
    to: ParamVector,
    current: ParamVector,
    duration_secs: f64,
    timing: Timing,
    infinite: bool,
    direction: f64,
    start_time: f64,
    generation: u64,
    pending_cancel: bool,
    status: AnimationStatus,
    frame_listeners: Vec<Box<dyn Fn(&ParamVector)>>,
    status_listeners: Vec<Box<dyn Fn(AnimationStatus)>>,
}

/// A parameter-vector tween, scheduled frame by frame through a
/// [`Scheduler`].
///
/// `generation` is bumped on every [`Animation::start`] and on
/// synchronous [`Animation::stop`]; an in-flight scheduled tick compares
/// its captured generation against the live one and silently does
/// nothing if they differ. This is what makes `stop()` take effect
/// immediately even though a tick for the *old* run may already be
/// sitting in the scheduler's `Render` band.
///
/// `cancel()` is the asynchronous counterpart:
/// it only raises `pending_cancel` and leaves `generation` alone, so the
/// already-scheduled tick for the current run observes the flag, fires
/// exactly one `Cancelled` status notification, and then stops
/// rescheduling — resolving "on the next frame" rather than synchronously.
pub struct Animation {
    scheduler: Rc<Scheduler>,
    clock: Rc<dyn Fn() -> f64>,
    state: RefCell<State>,
}

impl Animation {
    pub fn new(scheduler: Rc<Scheduler>, clock: Rc<dyn Fn() -> f64>) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            clock,
            state: RefCell::new(State {
                from: ParamVector::new(),
                to: ParamVector::new(),
                current: ParamVector::new(),
                duration_secs: 0.0,
                timing: Timing::default(),
                infinite: false,
                direction: 1.0,
                start_time: 0.0,
                generation: 0,
                pending_cancel: false,
                status: AnimationStatus::Idle,
                frame_listeners: Vec::new(),
                status_listeners: Vec::new(),
            }),
        })
    }

    pub fn status(&self) -> AnimationStatus {
        self.state.borrow().status
    }

    pub fn current(&self) -> ParamVector {
        self.state.borrow().current.clone()
    }

    pub fn on_frame(&self, listener: impl Fn(&ParamVector) + 'static) {
        self.state.borrow_mut().frame_listeners.push(Box::new(listener));
    }

    pub fn on_status_change(&self, listener: impl Fn(AnimationStatus) + 'static) {
        self.state.borrow_mut().status_listeners.push(Box::new(listener));
    }

    /// Begin tweening from the current parameter values to `target` over
    /// `duration_secs`, re-snapshotting `from` from whatever `current`
    /// already holds (so retargeting mid-flight starts from where the
    /// animation actually is, not from the previous `to`).
    ///
    /// `infinite` mirrors the ping-pong replay mode: on reaching
    /// `target` the animation reverses direction and runs again
    /// indefinitely instead of completing.
    pub fn start(
        this: &Rc<Animation>,
        target: ParamVector,
        duration_secs: f64,
        timing: Timing,
        infinite: bool,
    ) {
        let generation = {
            let mut state = this.state.borrow_mut();
            state.generation += 1;
            state.from = state.current.clone();
            state.to = target;
            state.duration_secs = duration_secs.max(0.0);
            state.timing = timing;
            state.infinite = infinite;
            state.direction = 1.0;
            state.start_time = (this.clock)();
            state.pending_cancel = false;
            state.status = AnimationStatus::Running;
            state.generation
        };
        Self::notify_status(this, AnimationStatus::Running);
        Self::schedule_tick(this, generation);
    }

    /// Halt synchronously, in place, at whatever `current` holds right
    /// now. Any tick already queued for this run becomes stale and is a
    /// no-op when it fires.
    pub fn stop(&self) {
        let was_running = {
            let mut state = self.state.borrow_mut();
            let was_running = state.status == AnimationStatus::Running;
            state.generation += 1;
            state.status = AnimationStatus::Cancelled;
            was_running
        };
        if was_running {
            self.emit_status(AnimationStatus::Cancelled);
        }
    }

    /// Request an asynchronous halt: takes effect the next time the
    /// in-flight tick for this run executes, rather than immediately.
    /// A no-op if the animation isn't running.
    pub fn cancel(&self) {
        self.state.borrow_mut().pending_cancel = true;
    }

    fn schedule_tick(this: &Rc<Animation>, generation: u64) {
        let animation = this.clone();
        this.scheduler
            .request_frame_cancellable(Priority::Render, move || {
                Self::tick(&animation, generation);
            });
    }

    fn tick(this: &Rc<Animation>, generation: u64) {
        let stale = this.state.borrow().generation != generation;
        if stale {
            return;
        }

        if this.state.borrow().pending_cancel {
            this.state.borrow_mut().status = AnimationStatus::Cancelled;
            Self::notify_status(this, AnimationStatus::Cancelled);
            return;
        }

        let (current, raw_progress, infinite) = {
            let mut state = this.state.borrow_mut();
            let elapsed = (this.clock)() - state.start_time;
            let raw = if state.duration_secs <= 0.0 {
                1.0
            } else {
                (elapsed / state.duration_secs).clamp(0.0, 1.0)
            };
            let directed = if state.direction >= 0.0 { raw } else { 1.0 - raw };
            let eased = state.timing.apply(directed);
            let (from, to) = (state.from.clone(), state.to.clone());
            state.current = lerp_params(&from, &to, eased);
            (state.current.clone(), raw, state.infinite)
        };

        Self::notify_frame(this, &current);

        if raw_progress < 1.0 {
            Self::schedule_tick(this, generation);
            return;
        }

        if infinite {
            let mut state = this.state.borrow_mut();
            state.direction = -state.direction;
            state.start_time = (this.clock)();
            drop(state);
            Self::schedule_tick(this, generation);
            return;
        }

        this.state.borrow_mut().status = AnimationStatus::Completed;
        Self::notify_status(this, AnimationStatus::Completed);
    }

    fn notify_frame(this: &Rc<Animation>, current: &ParamVector) {
        for listener in this.state.borrow().frame_listeners.iter() {
            listener(current);
        }
    }

    fn notify_status(this: &Rc<Animation>, status: AnimationStatus) {
        this.emit_status(status);
    }

    fn emit_status(&self, status: AnimationStatus) {
        for listener in self.state.borrow().status_listeners.iter() {
            listener(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as StdCell;

    fn params(pairs: &[(&str, f64)]) -> ParamVector {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn fake_clock() -> (Rc<StdCell<f64>>, Rc<dyn Fn() -> f64>) {
        let time = Rc::new(StdCell::new(0.0));
        let t = time.clone();
        (time, Rc::new(move || t.get()))
    }

    #[test]
    fn runs_to_completion_and_settles_on_target() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        Animation::start(
            &animation,
            params(&[("x", 10.0)]),
            1.0,
            Timing::Linear,
            false,
        );

        time.set(0.5);
        scheduler.run_frame();
        assert_eq!(animation.status(), AnimationStatus::Running);
        assert_eq!(animation.current().get("x"), Some(&5.0));

        time.set(1.0);
        scheduler.run_frame();
        assert_eq!(animation.status(), AnimationStatus::Completed);
        assert_eq!(animation.current().get("x"), Some(&10.0));
    }

    #[test]
    fn stop_takes_effect_immediately_even_with_a_tick_already_queued() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        Animation::start(&animation, params(&[("x", 10.0)]), 1.0, Timing::Linear, false);
        time.set(0.5);
        scheduler.run_frame();

        let frozen_x = *animation.current().get("x").unwrap();
        animation.stop();
        assert_eq!(animation.status(), AnimationStatus::Cancelled);

        time.set(1.0);
        scheduler.run_frame();
        assert_eq!(
            animation.current().get("x"),
            Some(&frozen_x),
            "a stale queued tick must not move current() after stop()"
        );
        assert_eq!(animation.status(), AnimationStatus::Cancelled);
    }

    #[test]
    fn cancel_resolves_on_the_next_scheduled_tick_not_synchronously() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        Animation::start(&animation, params(&[("x", 10.0)]), 1.0, Timing::Linear, false);
        time.set(0.5);
        scheduler.run_frame();

        animation.cancel();
        assert_eq!(
            animation.status(),
            AnimationStatus::Running,
            "cancel() must not take effect before the next tick runs"
        );

        scheduler.run_frame();
        assert_eq!(animation.status(), AnimationStatus::Cancelled);
    }

    #[test]
    fn infinite_mode_reverses_direction_instead_of_completing() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        Animation::start(&animation, params(&[("x", 10.0)]), 1.0, Timing::Linear, true);

        time.set(1.0);
        scheduler.run_frame();
        assert_eq!(animation.status(), AnimationStatus::Running);
        assert_eq!(animation.current().get("x"), Some(&10.0));

        time.set(2.0);
        scheduler.run_frame();
        assert_eq!(
            animation.current().get("x"),
            Some(&0.0),
            "after one full reversal the tween should be back near its start"
        );
        assert_eq!(animation.status(), AnimationStatus::Running);
    }

    #[test]
    fn restarting_mid_flight_snapshots_from_the_current_position() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        Animation::start(&animation, params(&[("x", 10.0)]), 1.0, Timing::Linear, false);
        time.set(0.5);
        scheduler.run_frame();
        let midpoint = *animation.current().get("x").unwrap();

        Animation::start(&animation, params(&[("x", 0.0)]), 1.0, Timing::Linear, false);
        assert_eq!(animation.current().get("x"), Some(&midpoint));
    }

    #[test]
    fn frame_listeners_observe_every_intermediate_value() {
        let scheduler = Rc::new(Scheduler::new());
        let (time, clock) = fake_clock();
        let animation = Animation::new(scheduler.clone(), clock);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        animation.on_frame(move |p| s.borrow_mut().push(*p.get("x").unwrap()));

        Animation::start(&animation, params(&[("x", 10.0)]), 1.0, Timing::Linear, false);
        time.set(0.5);
        scheduler.run_frame();
        time.set(1.0);
        scheduler.run_frame();

        assert_eq!(*seen.borrow(), vec![5.0, 10.0]);
    }
}
