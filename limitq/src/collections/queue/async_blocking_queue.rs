use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_condvar::Condvar;

use crate::collections::element::Element;
use crate::collections::queue::{
  AsyncBlockingQueueReader, AsyncBlockingQueueWriter, AsyncQueueBase, AsyncQueueReader, AsyncQueueWriter,
  CapacityError, LinkedBuffer, QueueBuffer, QueueError, RingBuffer,
};
use crate::concurrent::CancellationToken;


pub type AsyncArrayBlockingQueue<E> = AsyncBlockingQueue<E, RingBuffer<E>>;
pub type AsyncLinkedBlockingQueue<E> = AsyncBlockingQueue<E, LinkedBuffer<E>>;

/// Bounded queue shared between tokio tasks whose insert waits for space instead of failing.<br/>
/// 満杯時に失敗せず空きを待つ、tokio タスク間で共有される有界キュー。
///
/// The same monitor as [`BlockingQueue`](super::BlockingQueue), but waiting suspends the task
/// instead of the thread. A waiting operation ends early when its [`CancellationToken`] is
/// cancelled or when its future is dropped; in both cases the queue is left untouched.
pub struct AsyncBlockingQueue<E, S> {
  inner: Arc<Inner<E, S>>,
}

struct Inner<E, S> {
  buffer: Mutex<S>,
  not_empty: Condvar,
  not_full: Condvar,
  capacity: usize,
  _element: PhantomData<fn() -> E>,
}

impl<E, S> Clone for AsyncBlockingQueue<E, S> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

async fn sleep_until(deadline: Option<Instant>) {
  match deadline {
    Some(deadline) => tokio::time::sleep_until(deadline).await,
    None => futures::future::pending::<()>().await,
  }
}

impl<E, S> AsyncBlockingQueue<E, S>
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

  pub async fn len(&self) -> usize {
    self.inner.buffer.lock().await.len()
  }

  pub async fn offer(&self, element: E) -> Result<(), QueueError<E>> {
    let mut buffer = self.inner.buffer.lock().await;
    if buffer.len() >= self.inner.capacity {
      return Err(QueueError::Full(element));
    }
    buffer.push_back(element);
    self.inner.not_empty.notify_one();
    Ok(())
  }

  pub async fn poll(&self) -> Option<E> {
    let mut buffer = self.inner.buffer.lock().await;
    let element = buffer.pop_front()?;
    self.inner.not_full.notify_one();
    Some(element)
  }

  pub async fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    self.put_until(element, None, token).await
  }

  pub async fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>> {
    self.put_until(element, Instant::now().checked_add(timeout), token).await
  }

  pub async fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_until(None, token).await
  }

  pub async fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    self.take_until(Instant::now().checked_add(timeout), token).await
  }

  async fn put_until(
    &self,
    element: E,
    deadline: Option<Instant>,
    token: &CancellationToken,
  ) -> Result<(), QueueError<E>> {
    let capacity = self.inner.capacity;
    let mut buffer = self.inner.buffer.lock().await;
    loop {
      if token.is_cancelled() {
        let len = buffer.len();
        drop(buffer);
        return Err(self.abandon_put(element, true, len));
      }
      if buffer.len() < capacity {
        buffer.push_back(element);
        self.inner.not_empty.notify_one();
        return Ok(());
      }
      let len = buffer.len();
      tracing::trace!(capacity, len, "queue full, waiting for space");
      buffer = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(self.abandon_put(element, true, len)),
        buffer = self.inner.not_full.wait(buffer) => buffer,
        _ = sleep_until(deadline) => return Err(self.abandon_put(element, false, len)),
      };
    }
  }

  async fn take_until(&self, deadline: Option<Instant>, token: &CancellationToken) -> Result<E, QueueError<E>> {
    let capacity = self.inner.capacity;
    let mut buffer = self.inner.buffer.lock().await;
    loop {
      if token.is_cancelled() {
        let len = buffer.len();
        drop(buffer);
        return Err(self.abandon_take(true, len));
      }
      if let Some(element) = buffer.pop_front() {
        self.inner.not_full.notify_one();
        return Ok(element);
      }
      let len = buffer.len();
      tracing::trace!(capacity, len, "queue empty, waiting for an element");
      buffer = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(self.abandon_take(true, len)),
        buffer = self.inner.not_empty.wait(buffer) => buffer,
        _ = sleep_until(deadline) => return Err(self.abandon_take(false, len)),
      };
    }
  }

  // The abandoning task may have consumed a wakeup meant for another waiter on the same side,
  // so one is passed on. A spare wakeup only costs a re-check.
  // `len` is the size last seen under the lock; the guard may already be gone.
  fn abandon_put(&self, element: E, interrupted: bool, len: usize) -> QueueError<E> {
    self.inner.not_full.notify_one();
    if interrupted {
      tracing::debug!(capacity = self.inner.capacity, len, "put interrupted");
      QueueError::OfferInterrupted(element)
    } else {
      tracing::debug!(capacity = self.inner.capacity, len, "put timed out");
      QueueError::OfferTimeout(element)
    }
  }

  fn abandon_take(&self, interrupted: bool, len: usize) -> QueueError<E> {
    self.inner.not_empty.notify_one();
    if interrupted {
      tracing::debug!(capacity = self.inner.capacity, len, "take interrupted");
      QueueError::PollInterrupted
    } else {
      tracing::debug!(capacity = self.inner.capacity, len, "take timed out");
      QueueError::PollTimeout
    }
  }
}

impl<E, S> Debug for AsyncBlockingQueue<E, S>
where
  S: QueueBuffer<E>,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let len = self.inner.buffer.try_lock().ok().map(|buffer| buffer.len());
    f.debug_struct("AsyncBlockingQueue")
      .field("capacity", &self.inner.capacity)
      .field("len", &len)
      .finish()
  }
}

#[async_trait]
impl<E, S> AsyncQueueBase<E> for AsyncBlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  async fn len(&self) -> usize {
    AsyncBlockingQueue::len(self).await
  }

  fn capacity(&self) -> usize {
    AsyncBlockingQueue::capacity(self)
  }
}

#[async_trait]
impl<E, S> AsyncQueueWriter<E> for AsyncBlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  async fn offer(&self, element: E) -> Result<(), QueueError<E>> {
    AsyncBlockingQueue::offer(self, element).await
  }
}

#[async_trait]
impl<E, S> AsyncQueueReader<E> for AsyncBlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  async fn poll(&self) -> Option<E> {
    AsyncBlockingQueue::poll(self).await
  }
}

#[async_trait]
impl<E, S> AsyncBlockingQueueWriter<E> for AsyncBlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  async fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>> {
    AsyncBlockingQueue::put(self, element, token).await
  }

  async fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>> {
    AsyncBlockingQueue::put_timeout(self, element, timeout, token).await
  }
}

#[async_trait]
impl<E, S> AsyncBlockingQueueReader<E> for AsyncBlockingQueue<E, S>
where
  E: Element,
  S: QueueBuffer<E> + Send + 'static,
{
  async fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>> {
    AsyncBlockingQueue::take(self, token).await
  }

  async fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>> {
    AsyncBlockingQueue::take_timeout(self, timeout, token).await
  }
}
