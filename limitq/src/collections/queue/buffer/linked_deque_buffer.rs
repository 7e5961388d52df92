use std::collections::LinkedList;

use super::{DequeBuffer, QueueBuffer};

/// Doubly-linked buffer usable from both ends.
#[derive(Debug, Default)]
pub struct LinkedDequeBuffer<T> {
  list: LinkedList<T>,
}

impl<T> LinkedDequeBuffer<T> {
  pub fn new() -> Self {
    Self { list: LinkedList::new() }
  }
}

impl<T> QueueBuffer<T> for LinkedDequeBuffer<T> {
  fn with_capacity(_capacity: usize) -> Self {
    Self::new()
  }

  fn len(&self) -> usize {
    self.list.len()
  }

  fn push_back(&mut self, element: T) {
    self.list.push_back(element);
  }

  fn pop_front(&mut self) -> Option<T> {
    self.list.pop_front()
  }

  fn clear(&mut self) {
    self.list.clear();
  }
}

impl<T> DequeBuffer<T> for LinkedDequeBuffer<T> {
  fn push_front(&mut self, element: T) {
    self.list.push_front(element);
  }

  fn pop_back(&mut self) -> Option<T> {
    self.list.pop_back()
  }
}
