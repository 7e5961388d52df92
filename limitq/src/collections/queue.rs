use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

mod async_blocking_queue;
mod blocking_queue;
mod buffer;
mod queue_error;

pub use self::{async_blocking_queue::*, blocking_queue::*, buffer::*, queue_error::*};

use crate::collections::element::Element;
use crate::concurrent::CancellationToken;

/// A trait that defines the size queries of a bounded queue.<br/>
/// 有界キューのサイズ照会を定義するトレイト。
pub trait QueueBase<E> {
  /// Returns the number of elements currently in the queue.<br/>
  /// キューに現在格納されている要素数を返します。
  ///
  /// The value is a snapshot taken under the queue's lock and may be stale as soon as it is
  /// returned.
  fn len(&self) -> usize;

  /// Returns the fixed capacity of the queue.<br/>
  /// キューの固定容量を返します。
  fn capacity(&self) -> usize;

  /// Returns whether this queue is empty.<br/>
  /// このキューが空かどうかを返します。
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns whether the queue size has reached its capacity.<br/>
  /// このキューのサイズが容量まで到達したかどうかを返します。
  fn is_full(&self) -> bool {
    self.len() >= self.capacity()
  }

  /// Returns the number of elements that can be inserted without waiting.<br/>
  /// 待機せずに挿入できる要素数を返します。
  fn remaining_capacity(&self) -> usize {
    self.capacity().saturating_sub(self.len())
  }
}

/// Non-blocking insertion at the tail.
pub trait QueueWriter<E>: QueueBase<E> {
  /// Inserts the element if the queue is not full.<br/>
  /// キューが満杯でなければ要素を挿入します。
  ///
  /// # Return Value / 戻り値
  /// - `Ok(())` - If the element is inserted. / 要素が挿入された場合。
  /// - `Err(QueueError::Full(element))` - If the queue is full. / キューが満杯の場合。
  fn offer(&self, element: E) -> Result<(), QueueError<E>>;
}

/// Non-blocking removal from the head.
pub trait QueueReader<E>: QueueBase<E> {
  /// Retrieves and removes the head of the queue. Returns `None` if the queue is empty.<br/>
  /// キューの先頭を取得および削除します。キューが空の場合は `None` を返します。
  fn poll(&self) -> Option<E>;

  /// Removes up to `max` elements from the head, in order.<br/>
  /// 先頭から最大 `max` 個の要素を順に取り出します。
  fn drain(&self, max: usize) -> Vec<E>;

  /// Removes every element.<br/>
  /// 全ての要素を削除します。
  fn clear(&self);
}

/// Insertion that waits for space instead of failing.
pub trait BlockingQueueWriter<E>: QueueWriter<E> {
  /// Inserts the specified element into this queue. If necessary, waits until space is available.<br/>
  /// 指定された要素をこのキューに挿入します。必要に応じて、空きが生じるまで待機します。
  ///
  /// # Return Value / 戻り値
  /// - `Ok(())` - If the element is inserted. / 要素が挿入された場合。
  /// - `Err(QueueError::OfferInterrupted(element))` - If `token` is cancelled first. / 先に `token` がキャンセルされた場合。
  fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>>;

  /// Like [`put`](Self::put), but gives up once `timeout` has elapsed.<br/>
  /// [`put`](Self::put) と同様ですが、`timeout` が経過すると諦めます。
  ///
  /// # Return Value / 戻り値
  /// - `Err(QueueError::OfferTimeout(element))` - If no space became available in time. / 時間内に空きが生じなかった場合。
  fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>>;
}

/// Removal that waits for an element instead of returning empty.
pub trait BlockingQueueReader<E>: QueueReader<E> {
  /// Retrieves and removes the head of this queue, waiting until an element becomes available.<br/>
  /// このキューの先頭を取得して削除します。要素が利用可能になるまで待機します。
  ///
  /// # Return Value / 戻り値
  /// - `Ok(element)` - The head element. / 先頭の要素。
  /// - `Err(QueueError::PollInterrupted)` - If `token` is cancelled first. / 先に `token` がキャンセルされた場合。
  fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>>;

  /// Like [`take`](Self::take), but gives up once `timeout` has elapsed.<br/>
  /// [`take`](Self::take) と同様ですが、`timeout` が経過すると諦めます。
  fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>>;
}

/// Insertion at the head of a double-ended queue, with the same waiting rules as the tail.
pub trait BlockingDequeWriter<E>: BlockingQueueWriter<E> {
  fn offer_front(&self, element: E) -> Result<(), QueueError<E>>;

  fn put_front(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>>;

  fn put_front_timeout(&self, element: E, timeout: Duration, token: &CancellationToken)
    -> Result<(), QueueError<E>>;
}

/// Removal from the tail of a double-ended queue, with the same waiting rules as the head.
pub trait BlockingDequeReader<E>: BlockingQueueReader<E> {
  fn poll_back(&self) -> Option<E>;

  fn take_back(&self, token: &CancellationToken) -> Result<E, QueueError<E>>;

  fn take_back_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>>;
}

/// A trait that defines the size queries of a queue shared between tasks.<br/>
/// タスク間で共有されるキューのサイズ照会を定義するトレイト。
#[async_trait]
pub trait AsyncQueueBase<E: Element>: Debug + Send + Sync {
  /// Returns the number of elements currently in the queue.<br/>
  /// キューに現在格納されている要素数を返します。
  async fn len(&self) -> usize;

  /// Returns the fixed capacity of the queue.<br/>
  /// キューの固定容量を返します。
  fn capacity(&self) -> usize;

  async fn is_empty(&self) -> bool {
    self.len().await == 0
  }

  async fn is_full(&self) -> bool {
    self.len().await >= self.capacity()
  }

  async fn remaining_capacity(&self) -> usize {
    self.capacity().saturating_sub(self.len().await)
  }
}

#[async_trait]
pub trait AsyncQueueWriter<E: Element>: AsyncQueueBase<E> {
  /// Inserts the element if the queue is not full.<br/>
  /// キューが満杯でなければ要素を挿入します。
  async fn offer(&self, element: E) -> Result<(), QueueError<E>>;
}

#[async_trait]
pub trait AsyncQueueReader<E: Element>: AsyncQueueBase<E> {
  /// Retrieves and removes the head of the queue. Returns `None` if the queue is empty.<br/>
  /// キューの先頭を取得および削除します。キューが空の場合は `None` を返します。
  async fn poll(&self) -> Option<E>;
}

#[async_trait]
pub trait AsyncBlockingQueueWriter<E: Element>: AsyncQueueWriter<E> {
  /// Inserts the element, waiting for space if necessary.<br/>
  /// 要素を挿入します。必要に応じて空きが生じるまで待機します。
  async fn put(&self, element: E, token: &CancellationToken) -> Result<(), QueueError<E>>;

  async fn put_timeout(&self, element: E, timeout: Duration, token: &CancellationToken) -> Result<(), QueueError<E>>;
}

#[async_trait]
pub trait AsyncBlockingQueueReader<E: Element>: AsyncQueueReader<E> {
  /// Removes the head, waiting for an element if necessary.<br/>
  /// 先頭を取り出します。必要に応じて要素が利用可能になるまで待機します。
  async fn take(&self, token: &CancellationToken) -> Result<E, QueueError<E>>;

  async fn take_timeout(&self, timeout: Duration, token: &CancellationToken) -> Result<E, QueueError<E>>;
}
