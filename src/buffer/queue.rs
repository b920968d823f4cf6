use std::collections::VecDeque;

/// FIFO of serialized messages waiting to be sent.
///
/// Entries leave the queue only through [`PendingQueue::trim_front`] after a
/// confirmed send, or through [`PendingQueue::clear`].
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    entries: VecDeque<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.entries.extend(messages);
    }

    /// Copy of the current contents. Later appends do not show up in it.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Drops `count` entries from the front, keeping anything appended
    /// after the snapshot was taken.
    pub fn trim_front(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
