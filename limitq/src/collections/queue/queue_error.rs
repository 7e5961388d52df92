use thiserror::Error;

/// An error that occurs when a queue operation does not complete.<br/>
/// キューの操作が完了しなかった場合に発生するエラー。
///
/// Variants that carry `E` hand the rejected element back to the caller, so no element is
/// ever lost when an insert is abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError<E> {
  /// The queue was full and the non-blocking offer did not wait.<br/>
  /// キューが満杯で、ノンブロッキングの挿入は待機しなかった。
  #[error("Failed to offer an element: the queue is full")]
  Full(E),
  /// The caller was cancelled before the element could be inserted.<br/>
  /// 要素を挿入する前に呼び出し元がキャンセルされた。
  #[error("Interrupted while waiting to offer an element")]
  OfferInterrupted(E),
  /// The deadline elapsed before space became available.<br/>
  /// 空きが生じる前に期限が過ぎた。
  #[error("Timed out while waiting to offer an element")]
  OfferTimeout(E),
  /// The caller was cancelled before an element became available.<br/>
  /// 要素が利用可能になる前に呼び出し元がキャンセルされた。
  #[error("Interrupted while waiting to poll an element")]
  PollInterrupted,
  /// The deadline elapsed before an element became available.<br/>
  /// 要素が利用可能になる前に期限が過ぎた。
  #[error("Timed out while waiting to poll an element")]
  PollTimeout,
}

impl<E> QueueError<E> {
  /// Returns whether the operation was abandoned because of cancellation.
  pub fn is_interrupted(&self) -> bool {
    matches!(self, QueueError::OfferInterrupted(_) | QueueError::PollInterrupted)
  }

  /// Returns whether the operation was abandoned because its deadline elapsed.
  pub fn is_timeout(&self) -> bool {
    matches!(self, QueueError::OfferTimeout(_) | QueueError::PollTimeout)
  }

  /// Returns the element that could not be inserted, if any.
  pub fn into_element(self) -> Option<E> {
    match self {
      QueueError::Full(element) | QueueError::OfferInterrupted(element) | QueueError::OfferTimeout(element) => {
        Some(element)
      }
      QueueError::PollInterrupted | QueueError::PollTimeout => None,
    }
  }
}

/// Raised when a queue is constructed with a capacity of zero.<br/>
/// 容量ゼロでキューを生成しようとした場合に発生するエラー。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Capacity must be greater than zero")]
pub struct CapacityError;
