//! Bounded queues whose insert never fails for lack of space: a producer that
//! finds the queue full waits until a consumer frees a slot.
//!
//! The storage behind a queue is pluggable ([`RingBuffer`], [`LinkedBuffer`],
//! [`LinkedDequeBuffer`]); the synchronization is written once in
//! [`BlockingQueue`] (threads) and [`AsyncBlockingQueue`] (tokio tasks).
//!
//! ```
//! use limitq_rs::{ArrayBlockingQueue, CancellationToken};
//!
//! let queue = ArrayBlockingQueue::new(2);
//! let token = CancellationToken::new();
//!
//! queue.put("a", &token).unwrap();
//! queue.put("b", &token).unwrap();
//! assert!(queue.is_full());
//!
//! assert_eq!(queue.take(&token).unwrap(), "a");
//! assert_eq!(queue.poll(), Some("b"));
//! ```

pub mod collections;
pub mod concurrent;

#[cfg(test)]
mod test_support;

pub use collections::{
  ArrayBlockingQueue, AsyncArrayBlockingQueue, AsyncBlockingQueue, AsyncBlockingQueueReader, AsyncBlockingQueueWriter,
  AsyncLinkedBlockingQueue, AsyncQueueBase, AsyncQueueReader, AsyncQueueWriter, BlockingDequeReader,
  BlockingDequeWriter, BlockingQueue, BlockingQueueReader, BlockingQueueWriter, CapacityError, DequeBuffer, Element,
  LinkedBlockingDeque, LinkedBlockingQueue, LinkedBuffer, LinkedDequeBuffer, QueueBase, QueueBuffer, QueueError,
  QueueReader, QueueWriter, RingBuffer,
};
pub use concurrent::CancellationToken;
