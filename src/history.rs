/// Most recent past snapshots retained; the oldest is dropped beyond this.
pub const MAX_HISTORY: usize = 50;

/// Linear undo/redo container over immutable snapshots.
///
/// Every mutation of the wrapped value goes through [`set`](Self::set) or
/// [`set_with`](Self::set_with); the current value is only ever replaced,
/// never edited in place, so any observed snapshot stays consistent.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    past: Vec<T>,
    current: T,
    future: Vec<T>,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            past: Vec::new(),
            current: initial,
            future: Vec::new(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Replace the current value, remembering the old one. Clears the redo
    /// side and trims the past to [`MAX_HISTORY`] entries.
    pub fn set(&mut self, value: T) {
        self.past.push(std::mem::replace(&mut self.current, value));
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
        self.future.clear();
    }

    /// Like [`set`](Self::set), with the replacement derived from the
    /// current value.
    pub fn set_with(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.current);
        self.set(next);
    }

    /// Step back one snapshot. Silent no-op on empty past; returns whether
    /// a step was taken.
    pub fn undo(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                let redo = std::mem::replace(&mut self.current, previous);
                self.future.insert(0, redo);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Silent no-op on empty future; returns
    /// whether a step was taken.
    pub fn redo(&mut self) -> bool {
        if self.future.is_empty() {
            return false;
        }
        let next = self.future.remove(0);
        self.past.push(std::mem::replace(&mut self.current, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
