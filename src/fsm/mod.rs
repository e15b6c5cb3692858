//! Flat, single-active-state machine with multi-frame transitions.
//!
//! States are registered once with [`StateMachine::add_state`] and referred
//! to by [`StateId`]. A transition runs the outgoing state's `exit` hook and
//! exit steps, swaps `current`, then runs the incoming state's `enter` hook
//! and enter steps. Steps may span frames; while they run the machine is
//! *transitioning*, ticks are not dispatched, and further requests collapse
//! into a single pending slot (latest wins).
//!
//! # Usage
//! ```ignore
//! let mut fsm = StateMachine::<Scene>::new();
//! let walk = fsm.add_state(MoveState::new(&scene.world, squirrel));
//! fsm.initialize(&mut scene, walk)?;
//! // Each frame:
//! fsm.update(&mut scene, dt)?;
//! // Each fixed step:
//! fsm.fixed_update(&mut scene)?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod signal;
pub mod steps;

pub use signal::{Signal, Subscription};
pub use steps::{Progress, Pulse, StepRunner, Steps, Wait};

use crate::error::FsmError;

static NEXT_MACHINE: AtomicU64 = AtomicU64::new(0);

/// Handle to a state registered with a [`StateMachine`]. Only valid on the
/// machine that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId {
    machine: u64,
    index: usize,
}

impl StateId {
    /// Registration order within the issuing machine.
    pub fn index(self) -> usize {
        self.index
    }
}

/// One behavioral mode.
///
/// Lifecycle per activation:
/// 1. `set_owner()` then `enter()` then `enter_steps()`
/// 2. `tick()` / `fixed_tick()` each frame while active and not transitioning
/// 3. `exit()` then `exit_steps()`
///
/// Hooks never fail. Multi-frame work belongs in the step sequences.
pub trait State<C> {
    /// Stable human-readable tag, used in debug traces.
    fn name(&self) -> &str;

    /// Called once per activation, before `enter()`.
    fn set_owner(&mut self, _owner: Owner) {}

    fn enter(&mut self, _ctx: &mut C) {}

    fn enter_steps(&mut self, _ctx: &mut C) -> Steps {
        Steps::empty()
    }

    fn exit(&mut self, _ctx: &mut C) {}

    fn exit_steps(&mut self, _ctx: &mut C) -> Steps {
        Steps::empty()
    }

    fn tick(&mut self, _ctx: &mut C) {}

    fn fixed_tick(&mut self, _ctx: &mut C) {}
}

/// Non-owning back-reference from an active state to its machine.
///
/// Requests are buffered and applied by the machine as soon as the calling
/// hook returns.
#[derive(Clone)]
pub struct Owner {
    requests: Rc<RefCell<Vec<Option<StateId>>>>,
}

impl Owner {
    /// Ask the owning machine to transition to `target` (`None` deactivates).
    pub fn change_state(&self, target: impl Into<Option<StateId>>) {
        self.requests.borrow_mut().push(target.into());
    }
}

/// Payload of [`StateMachine::state_changed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChanged {
    pub from: Option<StateId>,
    pub to: Option<StateId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Exiting,
    Entering,
}

struct Transition {
    from: Option<StateId>,
    to: Option<StateId>,
    phase: Phase,
    runner: StepRunner,
}

pub struct StateMachine<C> {
    id: u64,
    states: Vec<Box<dyn State<C>>>,
    current: Option<StateId>,
    previous: Option<StateId>,
    pending: Option<StateId>,
    transition: Option<Transition>,
    /// `current` already ran its exit hook before its exit steps aborted.
    /// It gets no ticks, and the next transition skips its exit.
    exited: bool,
    debug: bool,
    /// Seconds spent in the current state. Reset to 0.0 on each swap.
    elapsed: f32,
    entered_this_frame: bool,
    requests: Rc<RefCell<Vec<Option<StateId>>>>,

    /// Fires after the incoming state's enter steps complete
    /// (or right after the swap when the target is `None`).
    pub state_changed: Signal<StateChanged>,
    /// Fires after `state_changed`, for non-`None` targets only.
    pub state_entered: Signal<StateId>,
    /// Fires after the outgoing state's exit steps complete.
    pub state_exited: Signal<StateId>,
}

impl<C> StateMachine<C> {
    pub fn new() -> Self {
        Self {
            id: NEXT_MACHINE.fetch_add(1, Ordering::Relaxed),
            states: Vec::new(),
            current: None,
            previous: None,
            pending: None,
            transition: None,
            exited: false,
            debug: false,
            elapsed: 0.0,
            entered_this_frame: false,
            requests: Rc::new(RefCell::new(Vec::new())),
            state_changed: Signal::new(),
            state_entered: Signal::new(),
            state_exited: Signal::new(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn add_state<S>(&mut self, state: S) -> StateId
    where
        S: State<C> + 'static,
    {
        self.add_boxed(Box::new(state))
    }

    pub fn add_boxed(&mut self, state: Box<dyn State<C>>) -> StateId {
        self.states.push(state);
        StateId {
            machine: self.id,
            index: self.states.len() - 1,
        }
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    /// The state that was current before the last swap.
    pub fn previous(&self) -> Option<StateId> {
        self.previous
    }

    pub fn pending(&self) -> Option<StateId> {
        self.pending
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns `true` from the swap until the new state's first tick.
    pub fn just_entered(&self) -> bool {
        self.entered_this_frame
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        if id.machine != self.id {
            return None;
        }
        self.states.get(id.index).map(|s| s.name())
    }

    /// Activate the first state. Same as [`change_state`](Self::change_state)
    /// on a machine with no current state.
    pub fn initialize(&mut self, ctx: &mut C, initial: StateId) -> Result<(), FsmError> {
        self.change_state(ctx, initial)
    }

    /// Request a transition to `target` (`None` deactivates the machine).
    ///
    /// While a transition is running the request is parked in the pending
    /// slot, replacing any earlier one. Otherwise the transition starts now
    /// and runs until its first suspension.
    ///
    /// The transitioning check comes first so that a request equal to
    /// `current` still overwrites an earlier pending target.
    pub fn change_state(
        &mut self,
        ctx: &mut C,
        target: impl Into<Option<StateId>>,
    ) -> Result<(), FsmError> {
        let target = target.into();
        if let Some(id) = target {
            self.check(id)?;
        }
        if self.transition.is_some() {
            self.queue(target);
            return Ok(());
        }
        if target == self.current && !self.exited {
            return Ok(());
        }
        self.start(ctx, target);
        self.drive(ctx, Pulse::Start)
    }

    /// Render-frame dispatch. Resumes a running transition, otherwise ticks
    /// the current state.
    pub fn update(&mut self, ctx: &mut C, dt: f32) -> Result<(), FsmError> {
        if self.transition.is_some() {
            return self.drive(ctx, Pulse::Frame(dt));
        }
        let Some(id) = self.current.filter(|_| !self.exited) else {
            return Ok(());
        };
        self.states[id.index].tick(ctx);
        self.elapsed += dt;
        self.entered_this_frame = false;
        self.apply_requests(ctx)
    }

    /// Fixed-step dispatch. Resumes a running transition, otherwise
    /// fixed-ticks the current state.
    pub fn fixed_update(&mut self, ctx: &mut C) -> Result<(), FsmError> {
        if self.transition.is_some() {
            return self.drive(ctx, Pulse::FixedFrame);
        }
        let Some(id) = self.current.filter(|_| !self.exited) else {
            return Ok(());
        };
        self.states[id.index].fixed_tick(ctx);
        self.apply_requests(ctx)
    }

    fn check(&self, id: StateId) -> Result<(), FsmError> {
        if id.machine == self.id && id.index < self.states.len() {
            Ok(())
        } else {
            Err(FsmError::UnknownState(id))
        }
    }

    fn tag(&self, id: Option<StateId>) -> String {
        id.and_then(|id| self.state_name(id))
            .unwrap_or("<none>")
            .to_string()
    }

    fn owner(&self) -> Owner {
        Owner {
            requests: Rc::clone(&self.requests),
        }
    }

    fn queue(&mut self, target: Option<StateId>) {
        if self.debug {
            tracing::info!(target: "fsm", state = %self.tag(target), "queued transition");
        }
        self.pending = target;
    }

    fn take_requests(&self) -> Vec<Option<StateId>> {
        self.requests.borrow_mut().drain(..).collect()
    }

    /// Owner requests raised inside a transition go to the pending slot.
    fn absorb_requests(&mut self) {
        for target in self.take_requests() {
            if target.map_or(true, |id| self.check(id).is_ok()) {
                self.queue(target);
            }
        }
    }

    /// Apply every buffered owner request in order. Reports the first error.
    fn apply_requests(&mut self, ctx: &mut C) -> Result<(), FsmError> {
        let mut result = Ok(());
        for target in self.take_requests() {
            let applied = self.change_state(ctx, target);
            if result.is_ok() {
                result = applied;
            }
        }
        result
    }

    /// Mark the machine as transitioning and run the outgoing state's exit
    /// hook. Steps are left for [`drive`](Self::drive).
    fn start(&mut self, ctx: &mut C, to: Option<StateId>) {
        let from = self.current;
        self.transition = Some(Transition {
            from,
            to,
            phase: Phase::Exiting,
            runner: StepRunner::new(Steps::empty()),
        });

        let Some(old) = from else {
            return;
        };
        if std::mem::take(&mut self.exited) {
            return;
        }
        if self.debug {
            tracing::info!(target: "fsm", state = %self.tag(from), "exiting");
        }
        let state = &mut self.states[old.index];
        state.exit(ctx);
        let steps = state.exit_steps(ctx);
        if let Some(transition) = self.transition.as_mut() {
            transition.runner = StepRunner::new(steps);
        }
        self.absorb_requests();
    }

    fn enter(&mut self, ctx: &mut C, new: StateId) {
        if self.debug {
            tracing::info!(target: "fsm", state = %self.tag(Some(new)), "entering");
        }
        let owner = self.owner();
        let state = &mut self.states[new.index];
        state.set_owner(owner);
        state.enter(ctx);
        let steps = state.enter_steps(ctx);
        if let Some(transition) = self.transition.as_mut() {
            transition.phase = Phase::Entering;
            transition.runner = StepRunner::new(steps);
        }
        self.absorb_requests();
    }

    /// Run the in-flight transition until it suspends or completes. A
    /// completed transition consumes the pending slot and keeps going.
    fn drive(&mut self, ctx: &mut C, mut pulse: Pulse) -> Result<(), FsmError> {
        loop {
            let Some(transition) = self.transition.as_mut() else {
                return Ok(());
            };
            let progress = transition.runner.resume(pulse);
            let (from, to, phase) = (transition.from, transition.to, transition.phase);
            match progress {
                Progress::Suspended => return Ok(()),
                Progress::Aborted(reason) => return Err(self.abort(reason)),
                Progress::Done => {}
            }
            pulse = Pulse::Start;

            if phase == Phase::Exiting {
                if let Some(old) = from {
                    self.state_exited.emit(&old);
                }
                self.previous = from;
                self.current = to;
                self.elapsed = 0.0;
                self.entered_this_frame = true;
                if let Some(new) = to {
                    self.enter(ctx, new);
                    continue;
                }
            }

            self.state_changed.emit(&StateChanged { from, to });
            if let Some(new) = to {
                self.state_entered.emit(&new);
            }
            self.transition = None;

            if let Some(next) = self.pending.take() {
                if Some(next) != self.current {
                    self.start(ctx, Some(next));
                }
            }
        }
    }

    fn abort(&mut self, reason: String) -> FsmError {
        let failed = self.transition.take().and_then(|t| match t.phase {
            Phase::Exiting => {
                self.exited = t.from.is_some();
                t.from
            }
            Phase::Entering => t.to,
        });
        self.pending = None;
        let state = self.tag(failed);
        tracing::error!(target: "fsm", state = %state, reason = %reason, "transition aborted");
        FsmError::Aborted { state, reason }
    }
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}
