mod linked_buffer;
mod linked_deque_buffer;
mod ring_buffer;

pub use self::{linked_buffer::*, linked_deque_buffer::*, ring_buffer::*};

/// Storage strategy behind a bounded queue.
///
/// A buffer only stores elements; it knows nothing about threads and never enforces the
/// queue's bound. Callers must not push more than the `capacity` passed to
/// [`QueueBuffer::with_capacity`].
///
/// # Type Parameters
///
/// * `E` - Type of elements stored in the buffer
pub trait QueueBuffer<E> {
  /// Creates an empty buffer that will hold at most `capacity` elements.
  fn with_capacity(capacity: usize) -> Self
  where
    Self: Sized;

  /// Returns the number of stored elements.
  fn len(&self) -> usize;

  /// Returns `true` if no element is stored.
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Appends an element at the tail.
  fn push_back(&mut self, element: E);

  /// Removes and returns the head element, or `None` if the buffer is empty.
  fn pop_front(&mut self) -> Option<E>;

  /// Drops every stored element.
  fn clear(&mut self) {
    while self.pop_front().is_some() {}
  }
}

/// Storage strategy that can also be used from the opposite end.
pub trait DequeBuffer<E>: QueueBuffer<E> {
  /// Inserts an element before the current head.
  fn push_front(&mut self, element: E);

  /// Removes and returns the tail element, or `None` if the buffer is empty.
  fn pop_back(&mut self) -> Option<E>;
}
