/// Handle returned by [`Signal::subscribe`], used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// A synchronous event channel.
///
/// Handlers run in registration order, on the caller's stack, each time the
/// signal is emitted.
pub struct Signal<E> {
    next_id: u64,
    handlers: Vec<(Subscription, Box<dyn FnMut(&E)>)>,
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::<u32>::new();
        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            signal.subscribe(move |v| log.borrow_mut().push(format!("{tag}{v}")));
        }
        signal.emit(&7);
        assert_eq!(*log.borrow(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn unsubscribed_handler_is_not_called() {
        let hits = Rc::new(RefCell::new(0));
        let mut signal = Signal::<()>::new();
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |_| *h.borrow_mut() += 1);
        signal.emit(&());
        assert!(signal.unsubscribe(sub));
        assert!(!signal.unsubscribe(sub));
        signal.emit(&());
        assert_eq!(*hits.borrow(), 1);
    }
}
