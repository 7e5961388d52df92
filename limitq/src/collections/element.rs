/// Constraints for values that can be stored in the queues of this crate.
///
/// Elements cross thread boundaries when a producer hands them to a consumer, so they
/// must be `Send`.
///
/// `'static` is required because a parked caller registers its queue, elements included,
/// with a [`CancellationToken`](crate::concurrent::CancellationToken) that may outlive any
/// borrow. Queue owned values, or share borrowed data through `Arc`.
///
/// ```compile_fail
/// use limitq_rs::ArrayBlockingQueue;
///
/// let owned = String::from("borrowed");
/// let queue = ArrayBlockingQueue::new(1);
/// queue.offer(owned.as_str()).unwrap();
/// ```
pub trait Element: Send + 'static {}

impl<T> Element for T where T: Send + 'static {}
