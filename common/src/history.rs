use std::collections::VecDeque;

/// Rolling window of the most recent probe results, oldest first.
///
/// The window always holds exactly `capacity` slots. Slots that have not been
/// filled yet are `None`, which lets a renderer keep a stable number of lines.
#[derive(Debug, Clone)]
pub struct PingHistory<T> {
    slots: VecDeque<Option<T>>,
    capacity: usize,
}

impl<T: Clone> PingHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            capacity,
        }
    }

    pub fn push(&mut self, item: Option<T>) {
        self.slots.pop_front();
        self.slots.push_back(item);
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn snapshot(&self) -> Vec<Option<T>> {
        self.slots.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<T>> {
        self.slots.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest filled slot, if any.
    pub fn latest(&self) -> Option<&T> {
        self.slots.back().and_then(Option::as_ref)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
