//! Shared helpers: a probe state that records its hooks into a shared log,
//! and a machine wired to record its events into the same log.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use squirrel::fsm::{Owner, State, StateChanged, StateId, StateMachine, Steps, Wait};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

pub struct Probe {
    pub name: &'static str,
    pub log: Log,
    pub enter_frames: usize,
    pub exit_frames: usize,
    pub abort_on_enter: bool,
    pub abort_on_exit: bool,
    /// Targets requested through the owner on the next tick, in order.
    pub request_on_tick: Rc<RefCell<Vec<StateId>>>,
    owner: Option<Owner>,
}

impl Probe {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            enter_frames: 0,
            exit_frames: 0,
            abort_on_enter: false,
            abort_on_exit: false,
            request_on_tick: Rc::new(RefCell::new(Vec::new())),
            owner: None,
        }
    }

    pub fn entering_for(mut self, frames: usize) -> Self {
        self.enter_frames = frames;
        self
    }

    pub fn exiting_for(mut self, frames: usize) -> Self {
        self.exit_frames = frames;
        self
    }

    pub fn aborting(mut self) -> Self {
        self.abort_on_enter = true;
        self
    }

    pub fn aborting_exit(mut self) -> Self {
        self.abort_on_exit = true;
        self
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}.{}", self.name, hook));
    }
}

impl State<()> for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn set_owner(&mut self, owner: Owner) {
        self.owner = Some(owner);
    }

    fn enter(&mut self, _ctx: &mut ()) {
        self.record("enter");
    }

    fn enter_steps(&mut self, _ctx: &mut ()) -> Steps {
        self.record("enter_steps");
        if self.abort_on_enter {
            return Steps::new(vec![Wait::NextFrame, Wait::Abort("clip missing".into())]);
        }
        Steps::frames(self.enter_frames)
    }

    fn exit(&mut self, _ctx: &mut ()) {
        self.record("exit");
    }

    fn exit_steps(&mut self, _ctx: &mut ()) -> Steps {
        self.record("exit_steps");
        if self.abort_on_exit {
            return Steps::new(vec![Wait::NextFrame, Wait::Abort("boom".into())]);
        }
        Steps::frames(self.exit_frames)
    }

    fn tick(&mut self, _ctx: &mut ()) {
        self.record("tick");
        let targets = std::mem::take(&mut *self.request_on_tick.borrow_mut());
        if let Some(owner) = &self.owner {
            for target in targets {
                owner.change_state(target);
            }
        }
    }

    fn fixed_tick(&mut self, _ctx: &mut ()) {
        self.record("fixed_tick");
    }
}

/// Register `probes` in order and log every event as
/// `exited:X`, `changed:X->Y`, `entered:Y` (`-` for no state).
pub fn wire(probes: Vec<Probe>, log: &Log) -> (StateMachine<()>, Vec<StateId>) {
    let mut fsm = StateMachine::new();
    let names: Rc<Vec<&'static str>> = Rc::new(probes.iter().map(|p| p.name).collect());
    let ids = probes.into_iter().map(|p| fsm.add_state(p)).collect();

    let tag = {
        let names = Rc::clone(&names);
        move |id: Option<StateId>| id.map_or("-", |id| names[id.index()])
    };

    let (l, t) = (Rc::clone(log), tag.clone());
    fsm.state_exited
        .subscribe(move |id: &StateId| l.borrow_mut().push(format!("exited:{}", t(Some(*id)))));
    let (l, t) = (Rc::clone(log), tag.clone());
    fsm.state_changed.subscribe(move |e: &StateChanged| {
        l.borrow_mut()
            .push(format!("changed:{}->{}", t(e.from), t(e.to)))
    });
    let (l, t) = (Rc::clone(log), tag);
    fsm.state_entered
        .subscribe(move |id: &StateId| l.borrow_mut().push(format!("entered:{}", t(Some(*id)))));

    (fsm, ids)
}
