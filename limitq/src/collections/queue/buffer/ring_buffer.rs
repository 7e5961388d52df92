use std::fmt::{Debug, Formatter};

use super::{DequeBuffer, QueueBuffer};

/// Array-backed circular buffer.
///
/// All `capacity` slots are allocated up front, so a bounded queue built on it never
/// allocates after construction. Pushing into a full ring doubles the slot array instead of
/// overwriting; queues never let that happen.
pub struct RingBuffer<T> {
  buf: Box<[Option<T>]>,
  head: usize,
  tail: usize,
  len: usize,
}

impl<T> RingBuffer<T> {
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "capacity must be > 0");
    Self {
      buf: Self::alloc_buffer(capacity),
      head: 0,
      tail: 0,
      len: 0,
    }
  }

  /// Number of allocated slots.
  pub fn slots(&self) -> usize {
    self.buf.len()
  }

  fn alloc_buffer(capacity: usize) -> Box<[Option<T>]> {
    let mut vec = Vec::with_capacity(capacity);
    vec.resize_with(capacity, || None);
    vec.into_boxed_slice()
  }

  fn is_full(&self) -> bool {
    self.len == self.buf.len()
  }

  fn grow(&mut self) {
    let new_cap = self.buf.len().saturating_mul(2).max(1);
    let mut items = Vec::with_capacity(self.len);
    while let Some(item) = self.pop_front() {
      items.push(item);
    }

    self.buf = Self::alloc_buffer(new_cap);
    self.head = 0;
    self.tail = 0;

    for item in items {
      self.push_back(item);
    }
  }

  fn next(&self, index: usize) -> usize {
    let target = index + 1;
    if target == self.buf.len() {
      0
    } else {
      target
    }
  }

  fn prev(&self, index: usize) -> usize {
    if index == 0 {
      self.buf.len() - 1
    } else {
      index - 1
    }
  }
}

impl<T> QueueBuffer<T> for RingBuffer<T> {
  fn with_capacity(capacity: usize) -> Self {
    Self::new(capacity)
  }

  fn len(&self) -> usize {
    self.len
  }

  fn push_back(&mut self, element: T) {
    if self.is_full() {
      self.grow();
    }
    self.buf[self.tail] = Some(element);
    self.tail = self.next(self.tail);
    self.len += 1;
  }

  fn pop_front(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }
    let item = self.buf[self.head].take();
    self.head = self.next(self.head);
    self.len -= 1;
    item
  }

  fn clear(&mut self) {
    self.buf.iter_mut().for_each(|slot| *slot = None);
    self.head = 0;
    self.tail = 0;
    self.len = 0;
  }
}

impl<T> DequeBuffer<T> for RingBuffer<T> {
  fn push_front(&mut self, element: T) {
    if self.is_full() {
      self.grow();
    }
    self.head = self.prev(self.head);
    self.buf[self.head] = Some(element);
    self.len += 1;
  }

  fn pop_back(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }
    self.tail = self.prev(self.tail);
    self.len -= 1;
    self.buf[self.tail].take()
  }
}

impl<T> Debug for RingBuffer<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RingBuffer")
      .field("slots", &self.buf.len())
      .field("head", &self.head)
      .field("tail", &self.tail)
      .field("len", &self.len)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ring_buffer_push_pop() {
    let mut buffer = RingBuffer::new(2);
    buffer.push_back(1);
    buffer.push_back(2);

    assert_eq!(buffer.pop_front(), Some(1));
    assert_eq!(buffer.pop_front(), Some(2));
    assert_eq!(buffer.pop_front(), None);
  }

  #[test]
  fn ring_buffer_wraps_around() {
    let mut buffer = RingBuffer::new(3);
    for round in 0..5 {
      buffer.push_back(round * 2);
      buffer.push_back(round * 2 + 1);
      assert_eq!(buffer.pop_front(), Some(round * 2));
      assert_eq!(buffer.pop_front(), Some(round * 2 + 1));
    }
    assert!(buffer.is_empty());
    assert_eq!(buffer.slots(), 3);
  }

  #[test]
  fn ring_buffer_used_as_deque() {
    let mut buffer = RingBuffer::new(4);
    buffer.push_back(2);
    buffer.push_front(1);
    buffer.push_back(3);
    buffer.push_front(0);

    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.pop_back(), Some(3));
    assert_eq!(buffer.pop_front(), Some(0));
    assert_eq!(buffer.pop_back(), Some(2));
    assert_eq!(buffer.pop_back(), Some(1));
    assert_eq!(buffer.pop_back(), None);
  }

  #[test]
  fn ring_buffer_grows_when_overfilled() {
    let mut buffer = RingBuffer::new(1);
    buffer.push_back(1);
    buffer.push_back(2);
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.slots(), 2);
    assert_eq!(buffer.pop_front(), Some(1));
    assert_eq!(buffer.pop_front(), Some(2));
  }

  #[test]
  fn ring_buffer_clear_resets_positions() {
    let mut buffer = RingBuffer::new(2);
    buffer.push_back("a".to_string());
    buffer.push_back("b".to_string());
    buffer.pop_front();
    buffer.clear();

    assert!(buffer.is_empty());
    buffer.push_back("c".to_string());
    assert_eq!(buffer.pop_front().as_deref(), Some("c"));
  }

  #[test]
  #[should_panic(expected = "capacity must be > 0")]
  fn ring_buffer_rejects_zero_capacity() {
    let _ = RingBuffer::<i32>::new(0);
  }
}
