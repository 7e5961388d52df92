use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use crate::collections::element::Element;
use crate::collections::queue::{
  BlockingDequeReader, BlockingDequeWriter, BlockingQueueReader, BlockingQueueWriter, CapacityError, DequeBuffer,
  LinkedBuffer, LinkedDequeBuffer, QueueBase, QueueBuffer, QueueError, QueueReader, QueueWriter, RingBuffer,
};
use crate::concurrent::{CancellationToken, Interruptible, Registration};


/// Blocking queue backed by a fixed array of slots.
pub type ArrayBlockingQueue<E> = BlockingQueue<E, RingBuffer<E>>;
/// Blocking queue backed by a singly-linked list.
pub type LinkedBlockingQueue<E> = BlockingQueue<E, LinkedBuffer<E>>;
/// Double-ended blocking queue backed by a doubly-linked list.
pub type LinkedBlockingDeque<E> = BlockingQueue<E, LinkedDequeBuffer<E>>;

/// Bounded queue shared between threads whose insert waits for space instead of failing.<br/>
/// 満杯時に失敗せず空きを待つ、スレッド間で共有される有界キュー。
///
/// All state sits behind one mutex with two wait conditions: producers park on "not full",
/// consumers on "not empty". A parked caller holds no lock and re-checks its condition every
/// time it wakes.
///
/// Blocking operations take a [`CancellationToken`]. Cancelling it makes every operation
/// parked with it return [`QueueError::OfferInterrupted`] (handing the element back) or
/// [`QueueError::PollInterrupted`], leaving the queue untouched. A token that is already
/// cancelled on entry fails the operation immediately. Timed variants report
/// [`QueueError::OfferTimeout`] / [`QueueError::PollTimeout`] instead.
///
/// Elements come out in insertion order. When several callers are parked on the same
/// condition, the order in which they are released is unspecified.
///
/// Cloning the queue yields another handle to the same queue.
pub struct BlockingQueue<E, S> {
  inner: Arc<Inner<E, S>>,
}

struct Inner<E, S> {
  buffer: Mutex<S>,
  not_empty: Condvar,
  not_full: Condvar,
  capacity: usize,
  _element: PhantomData<fn() -> E>,
}

impl<E, S> Inner<E, S> {
  fn lock(&self) -> MutexGuard<'_, S> {
    // Buffer operations never panic halfway through a mutation, so a poisoned buffer is intact.
    self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<E, S: Send> Interruptible for Inner<E, S> {
  fn interrupt_waiters(&self) {
    // Taking the lock orders this wakeup after any waiter that checked its token and is
    // about to park.
    let _buffer = self.lock();
    self.not_full.notify_all();
    self.not_empty.notify_all();
  }
}

impl<E, S> Clone for BlockingQueue<E, S> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

fn deadline_after(timeout: Duration) -> Option<Instant> {
  // A timeout too large to represent waits without a deadline.
  Instant::now().checked_add(timeout)
}

impl<E, S> BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  /// Creates a queue holding at most `capacity` elements.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is zero.
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "Capacity must be greater than zero");
    Self::with_storage(S::with_capacity(capacity), capacity)
  }

  /// Creates a queue holding at most `capacity` elements, rejecting a zero capacity.
  pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
    if capacity == 0 {
      return Err(CapacityError);
    }
    Ok(Self::with_storage(S::with_capacity(capacity), capacity))
  }

  fn with_storage(storage: S, capacity: usize) -> Self {
    Self {
      inner: Arc::new(Inner {
        buffer: Mutex::new(storage),
        not_empty: Condvar::new(),
        not_full: Condvar::new(),
        capacity,
        _element: PhantomData,
      }),
    }
  }

  pub fn capacity(&self) -> usize {
    self.inner.capacity
  }

  pub fn len(&self) -> usize {
    self.inner.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn is_full(&self) -> bool {
    self.len() >= self.inner.capacity
  }

  pub fn remaining_capacity(&self) -> usize {
    self.inner.capacity.saturating_sub(self.len())
  }

  /// Appends the element if there is room, without waiting.
  pub fn offer(&self, element: E) -> Result<(), QueueError<E>> {
    self.offer_with(element, S::push_back)
  }

  /// Removes the head element if there is one, without waiting.
  pub fn poll(&self) -> Option<E> {
    self.poll_with(S::pop_front)
  }

  /// Appends the element, waiting for space as long as needed.
  pub fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    self.put_with(element, None, token, S::push_back)
  }

  /// Appends the element, waiting for space at most `timeout`.
  pub fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>> {
    self.put_with(element, deadline_after(timeout), token, S::push_back)
  }

  /// Removes the head element, waiting for one as long as needed.
  pub fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_with(None, token, S::pop_front)
  }

  /// Removes the head element, waiting for one at most `timeout`.
  pub fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_with(deadline_after(timeout), token, S::pop_front)
  }

  /// Removes up to `max` elements from the head, in order, and wakes producers waiting for space.
  pub fn drain(&self, max: usize) -> Vec<E> {
    let mut buffer = self.inner.lock();
    let mut drained = Vec::with_capacity(max.min(buffer.len()));
    while drained.len() < max {
      match buffer.pop_front() {
        Some(element) => drained.push(element),
        None => break,
      }
    }
    if !drained.is_empty() {
      self.inner.not_full.notify_all();
    }
    drained
  }

  /// Drops every element and wakes producers waiting for space.
  pub fn clear(&self) {
    let mut buffer = self.inner.lock();
    buffer.clear();
    self.inner.not_full.notify_all();
  }

  fn waiter(&self) -> Weak<dyn Interruptible> {
    let weak: Weak<Inner<E, S>> = Arc::downgrade(&self.inner);
    weak
  }

  fn offer_with(&self, element: E, insert: fn(&mut S, E)) -> Result<(), QueueError<E>> {
    let mut buffer = self.inner.lock();
    if buffer.len() >= self.inner.capacity {
      return Err(QueueError::Full(element));
    }
    insert(&mut *buffer, element);
    self.inner.not_empty.notify_one();
    Ok(())
  }

  fn poll_with(&self, remove: fn(&mut S) -> Option<E>) -> Option<E> {
    let mut buffer = self.inner.lock();
    let element = remove(&mut *buffer)?;
    self.inner.not_full.notify_one();
    Some(element)
  }

  fn put_with(
    &self,
    element: E,
    deadline: Option<Instant>,
    token: &CancellationToken,
    insert: fn(&mut S, E),
  ) -> Result<(), QueueError<E>> {
    let capacity = self.inner.capacity;
    let mut registration: Option<Registration<'_>> = None;
    let mut buffer = self.inner.lock();
    loop {
      if token.is_cancelled() {
        self.pass_on_space(&*buffer);
        tracing::debug!(capacity, len = buffer.len(), "put interrupted");
        return Err(QueueError::OfferInterrupted(element));
      }
      if buffer.len() < capacity {
        insert(&mut *buffer, element);
        self.inner.not_empty.notify_one();
        return Ok(());
      }
      if registration.is_none() {
        registration = Some(token.register(self.waiter()));
        continue;
      }
      tracing::trace!(capacity, len = buffer.len(), "queue full, waiting for space");
      buffer = match deadline {
        None => self.inner.not_full.wait(buffer).unwrap_or_else(PoisonError::into_inner),
        Some(deadline) => {
          let now = Instant::now();
          if now >= deadline {
            self.pass_on_space(&*buffer);
            tracing::debug!(capacity, len = buffer.len(), "put timed out");
            return Err(QueueError::OfferTimeout(element));
          }
          self
            .inner
            .not_full
            .wait_timeout(buffer, deadline - now)
            .unwrap_or_else(PoisonError::into_inner)
            .0
        }
      };
    }
  }

  fn take_with(
    &self,
    deadline: Option<Instant>,
    token: &CancellationToken,
    remove: fn(&mut S) -> Option<E>,
  ) -> Result<E, QueueError<E>> {
    let capacity = self.inner.capacity;
    let mut registration: Option<Registration<'_>> = None;
    let mut buffer = self.inner.lock();
    loop {
      if token.is_cancelled() {
        self.pass_on_element(&*buffer);
        tracing::debug!(capacity, len = buffer.len(), "take interrupted");
        return Err(QueueError::PollInterrupted);
      }
      if let Some(element) = remove(&mut *buffer) {
        self.inner.not_full.notify_one();
        return Ok(element);
      }
      if registration.is_none() {
        registration = Some(token.register(self.waiter()));
        continue;
      }
      tracing::trace!(capacity, len = buffer.len(), "queue empty, waiting for an element");
      buffer = match deadline {
        None => self.inner.not_empty.wait(buffer).unwrap_or_else(PoisonError::into_inner),
        Some(deadline) => {
          let now = Instant::now();
          if now >= deadline {
            self.pass_on_element(&*buffer);
            tracing::debug!(capacity, len = buffer.len(), "take timed out");
            return Err(QueueError::PollTimeout);
          }
          self
            .inner
            .not_empty
            .wait_timeout(buffer, deadline - now)
            .unwrap_or_else(PoisonError::into_inner)
            .0
        }
      };
    }
  }

  // An abandoning waiter may have consumed the notify_one meant for another producer.
  fn pass_on_space(&self, buffer: &S) {
    if buffer.len() < self.inner.capacity {
      self.inner.not_full.notify_one();
    }
  }

  fn pass_on_element(&self, buffer: &S) {
    if !buffer.is_empty() {
      self.inner.not_empty.notify_one();
    }
  }
}

impl<E, S> BlockingQueue<E, S>
where
  E: Element,
  S: DequeBuffer<E> + Send + 'static,
{
  /// Inserts the element before the head if there is room, without waiting.
  pub fn offer_front(&self, element: E) -> Result<(), QueueError<E>> {
    self.offer_with(element, S::push_front)
  }

  /// Removes the tail element if there is one, without waiting.
  pub fn poll_back(&self) -> Option<E> {
    self.poll_with(S::pop_back)
  }

  /// Inserts the element before the head, waiting for space as long as needed.
  pub fn put_front(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    self.put_with(element, None, token, S::push_front)
  }

  pub fn put_front_timeout(
    &self,
    element: E,
    timeout: Duration,
    token: &CancellationToken,
  ) -> Result<(), QueueError<E>> {
    self.put_with(element, deadline_after(timeout), token, S::push_front)
  }

  /// Removes the tail element, waiting for one as long as needed.
  pub fn take_back(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_with(None, token, S::pop_back)
  }

  pub fn take_back_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_with(deadline_after(timeout), token, S::pop_back)
  }
}

impl<E, S> Debug for BlockingQueue<E, S>
where
  S: QueueBuffer<E>,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let len = self.inner.buffer.try_lock().ok().map(|buffer| buffer.len());
    f.debug_struct("BlockingQueue")
      .field("capacity", &self.inner.capacity)
      .field("len", &len)
      .finish()
  }
}

impl<E, S> QueueBase<E> for BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  fn len(&self) -> usize {
    BlockingQueue::len(self)
  }

  fn capacity(&self) -> usize {
    BlockingQueue::capacity(self)
  }
}

impl<E, S> QueueWriter<E> for BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  fn offer(&self, element: E) -> Result<(), QueueError<E>> {
    BlockingQueue::offer(self, element)
  }
}

impl<E, S> QueueReader<E> for BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  fn poll(&self) -> Option<E> {
    BlockingQueue::poll(self)
  }

  fn drain(&self, max: usize) -> Vec<E> {
    BlockingQueue::drain(self, max)
  }

  fn clear(&self) {
    BlockingQueue::clear(self)
  }
}

impl<E, S> BlockingQueueWriter<E> for BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    BlockingQueue::put(self, element, token)
  }

  fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>> {
    BlockingQueue::put_timeout(self, element, timeout, token)
  }
}

impl<E, S> BlockingQueueReader<E> for BlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    BlockingQueue::take(self, token)
  }

  fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    BlockingQueue::take_timeout(self, timeout, token)
  }
}

impl<E, S> BlockingDequeWriter<E> for BlockingQueue<E, S>
where
  E: Element,
  S: DequeBuffer<E> + Send + 'static,
{
  fn offer_front(&self, element: E) -> Result<(), QueueError<E>> {
    BlockingQueue::offer_front(self, element)
  }

  fn put_front(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    BlockingQueue::put_front(self, element, token)
  }

  fn put_front_timeout(
    &self,
    element: E,
    timeout: Duration,
    token: &CancellationToken,
  ) -> Result<(), QueueError<E>> {
    BlockingQueue::put_front_timeout(self, element, timeout, token)
  }
}

impl<E, S> BlockingDequeReader<E> for BlockingQueue<E, S>
where
  E: Element,
  S: DequeBuffer<E> + Send + 'static,
{
  fn poll_back(&self) -> Option<E> {
    BlockingQueue::poll_back(self)
  }

  fn take_back(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    BlockingQueue::take_back(self, token)
  }

  fn take_back_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    BlockingQueue::take_back_timeout(self, timeout, token)
  }
}
