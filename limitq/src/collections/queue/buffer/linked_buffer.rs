use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::QueueBuffer;

struct Node<T> {
  value: T,
  next: Option<NonNull<Node<T>>>,
}

/// Singly-linked FIFO buffer.
///
/// One node is allocated per pushed element and freed when the element is popped, so memory
/// follows the number of live elements rather than the capacity.
pub struct LinkedBuffer<T> {
  head: Option<NonNull<Node<T>>>,
  tail: Option<NonNull<Node<T>>>,
  len: usize,
  _owned: PhantomData<Box<Node<T>>>,
}

impl<T> LinkedBuffer<T> {
  pub fn new() -> Self {
    Self {
      head: None,
      tail: None,
      len: 0,
      _owned: PhantomData,
    }
  }
}

impl<T> Default for LinkedBuffer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> QueueBuffer<T> for LinkedBuffer<T> {
  fn with_capacity(_capacity: usize) -> Self {
    Self::new()
  }

  fn len(&self) -> usize {
    self.len
  }

  fn push_back(&mut self, element: T) {
    let node = Box::new(Node {
      value: element,
      next: None,
    });
    // SAFETY: Box::into_raw never returns null.
    let node = unsafe { NonNull::new_unchecked(Box::into_raw(node)) };
    match self.tail {
      // SAFETY: tail points to a node owned by this buffer.
      Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
      None => self.head = Some(node),
    }
    self.tail = Some(node);
    self.len += 1;
  }

  fn pop_front(&mut self) -> Option<T> {
    self.head.map(|head| {
      // SAFETY: head was produced by Box::into_raw in push_back and is unlinked here, so
      // ownership returns to exactly one Box.
      let node = unsafe { Box::from_raw(head.as_ptr()) };
      self.head = node.next;
      if self.head.is_none() {
        self.tail = None;
      }
      self.len -= 1;
      node.value
    })
  }
}

impl<T> Drop for LinkedBuffer<T> {
  fn drop(&mut self) {
    self.clear();
  }
}

// SAFETY: the buffer exclusively owns its nodes; the raw pointers are never shared.
unsafe impl<T: Send> Send for LinkedBuffer<T> {}
unsafe impl<T: Sync> Sync for LinkedBuffer<T> {}

impl<T> Debug for LinkedBuffer<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LinkedBuffer").field("len", &self.len).finish()
  }
}
