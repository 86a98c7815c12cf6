//! Minimal observer list for change notifications

/// Callbacks run in connection order on every [`Signal::emit`]
pub struct Signal<T> {
    slots: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, slot: impl FnMut(&T) + 'static) {
        self.slots.push(Box::new(slot));
    }

    pub fn emit(&mut self, value: &T) {
        for slot in &mut self.slots {
            slot(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emits_to_every_slot_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::new();
        let a = seen.clone();
        signal.connect(move |v: &i32| a.borrow_mut().push(*v));
        let b = seen.clone();
        signal.connect(move |v: &i32| b.borrow_mut().push(v * 10));
        signal.emit(&4);
        assert_eq!(*seen.borrow(), vec![4, 40]);
    }
}
