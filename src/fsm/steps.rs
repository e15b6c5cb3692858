/// A directive yielded by a step sequence, telling the scheduler when to
/// resume it.
pub enum Wait {
    /// Resume on the next render frame.
    NextFrame,
    /// Resume on the next fixed simulation frame.
    NextFixedFrame,
    /// Resume once at least this many seconds of frame time have passed.
    /// Always waits at least one frame.
    Seconds(f32),
    /// Run the nested sequence to completion, then continue this one.
    Nested(Steps),
    /// The engine could not complete the sequence. The runner stops and
    /// reports the reason.
    Abort(String),
}

impl std::fmt::Debug for Wait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NextFrame => write!(f, "NextFrame"),
            Self::NextFixedFrame => write!(f, "NextFixedFrame"),
            Self::Seconds(s) => write!(f, "Seconds({s})"),
            Self::Nested(_) => write!(f, "Nested(..)"),
            Self::Abort(reason) => write!(f, "Abort({reason:?})"),
        }
    }
}

/// A finite, lazy, non-restartable sequence of [`Wait`] tokens.
///
/// Used for multi-frame enter/exit work, e.g. holding a state until an
/// animation has had time to play.
pub struct Steps(Box<dyn Iterator<Item = Wait>>);

impl Steps {
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Wait>,
        I::IntoIter: 'static,
    {
        Self(Box::new(iter.into_iter()))
    }

    /// A sequence that completes immediately.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Wait `n` render frames.
    pub fn frames(n: usize) -> Self {
        Self::new(std::iter::repeat_with(|| Wait::NextFrame).take(n))
    }

    /// Wait `n` fixed simulation frames.
    pub fn fixed_frames(n: usize) -> Self {
        Self::new(std::iter::repeat_with(|| Wait::NextFixedFrame).take(n))
    }

    /// Wait for `seconds` of frame time.
    pub fn seconds(seconds: f32) -> Self {
        Self::new(std::iter::once(Wait::Seconds(seconds)))
    }
}

impl Iterator for Steps {
    type Item = Wait;

    fn next(&mut self) -> Option<Wait> {
        self.0.next()
    }
}

/// What woke the runner up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pulse {
    /// The sequence was just handed over; run until the first suspension.
    Start,
    /// A render frame elapsed, carrying its delta in seconds.
    Frame(f32),
    /// A fixed simulation frame elapsed.
    FixedFrame,
}

/// Result of resuming a runner.
#[derive(Debug, PartialEq)]
pub enum Progress {
    /// Parked on a wait token.
    Suspended,
    /// Every token has been consumed.
    Done,
    /// A sequence yielded [`Wait::Abort`].
    Aborted(String),
}

#[derive(Clone, Copy, Debug)]
enum Parked {
    Frame,
    FixedFrame,
    Seconds(f32),
}

/// Cooperative interpreter for a [`Steps`] sequence.
///
/// Nested sequences are kept on a stack; only the innermost one is pulled.
pub struct StepRunner {
    stack: Vec<Steps>,
    parked: Option<Parked>,
}

impl StepRunner {
    pub fn new(steps: Steps) -> Self {
        Self {
            stack: vec![steps],
            parked: None,
        }
    }

    pub fn is_parked(&self) -> bool {
        self.parked.is_some()
    }

    /// Advance the sequence as far as it will go for this pulse.
    pub fn resume(&mut self, pulse: Pulse) -> Progress {
        if let Some(parked) = self.parked {
            match (parked, pulse) {
                (Parked::Frame, Pulse::Frame(_)) | (Parked::FixedFrame, Pulse::FixedFrame) => {
                    self.parked = None;
                }
                (Parked::Seconds(remaining), Pulse::Frame(dt)) => {
                    let remaining = remaining - dt;
                    if remaining > 0.0 {
                        self.parked = Some(Parked::Seconds(remaining));
                        return Progress::Suspended;
                    }
                    self.parked = None;
                }
                _ => return Progress::Suspended,
            }
        }

        loop {
            let Some(top) = self.stack.last_mut() else {
                return Progress::Done;
            };
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Wait::NextFrame) => {
                    self.parked = Some(Parked::Frame);
                    return Progress::Suspended;
                }
                Some(Wait::NextFixedFrame) => {
                    self.parked = Some(Parked::FixedFrame);
                    return Progress::Suspended;
                }
                Some(Wait::Seconds(seconds)) => {
                    self.parked = Some(Parked::Seconds(seconds.max(0.0)));
                    return Progress::Suspended;
                }
                Some(Wait::Nested(steps)) => self.stack.push(steps),
                Some(Wait::Abort(reason)) => {
                    self.stack.clear();
                    return Progress::Aborted(reason);
                }
            }
        }
    }
}
