//! Listener registries with synchronous dispatch.
//!
//! Callbacks run on the caller's thread, in registration order, right after
//! the mutation that triggered them.

/// Handle returned by [`Listeners::add`]; pass it back to remove the listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

pub struct Listeners<T> {
    next_id: u64,
    entries: Vec<(ListenerToken, Box<dyn FnMut(&T)>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnMut(&T) + 'static) -> ListenerToken {
        let token = ListenerToken(self.next_id);
        self.next_id += 1;
        self.entries.push((token, Box::new(callback)));
        token
    }

    /// Returns false if the token was unknown or already removed.
    pub fn remove(&mut self, token: ListenerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != token);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: &T) {
        for (_, cb) in self.entries.iter_mut() {
            cb(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
