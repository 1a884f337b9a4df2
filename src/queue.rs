//! Fixed-capacity circular queue.

const DEFAULT_CAPACITY: usize = 10;

/// Ring buffer with a capacity fixed at construction. One slot of the
/// backing storage is kept unused to tell a full queue from an empty one.
pub struct CircularQueue<T> {
    data: Vec<Option<T>>,
    head: usize,
    tail: usize,
}

impl<T> CircularQueue<T> {
    /// A queue holding up to `capacity` items; zero falls back to a default
    /// capacity of 10.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        let mut data = Vec::new();
        data.resize_with(capacity + 1, || None);
        Self {
            data,
            head: 0,
            tail: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len() - 1
    }

    pub fn len(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.tail + self.data.len() - self.head
        }
    }

    /// Free space left.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tail == self.head
    }

    pub fn is_full(&self) -> bool {
        (self.tail + 1) % self.data.len() == self.head
    }

    /// Appends `item`; a full queue hands it back.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.data[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.data.len();
        Ok(())
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.data[self.head].take();
        self.head = (self.head + 1) % self.data.len();
        item
    }

    /// Oldest item, without removing it.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.data[self.head].as_ref()
    }

    /// Newest item, without removing it.
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let i = (self.tail + self.data.len() - 1) % self.data.len();
        self.data[i].as_ref()
    }
}
