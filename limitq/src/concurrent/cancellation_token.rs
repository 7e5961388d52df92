use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::Notify;

/// Something that parks callers and must wake them when their token is cancelled.
pub(crate) trait Interruptible: Send + Sync {
  /// Wakes every caller currently parked, so that each one re-checks its token.
  fn interrupt_waiters(&self);
}

/// Cooperative cancellation signal shared between a blocked caller and whoever wants to stop it.<br/>
/// ブロック中の呼び出し元と、それを停止したい側で共有される協調的キャンセルシグナル。
///
/// Every blocking queue operation takes a token. Cancelling it wakes the operation, which then
/// returns an "interrupted" error without touching the queue. The token keeps its cancelled
/// status after the operation returns, so outer code can observe it too; [`reset`](Self::reset)
/// clears it.
///
/// Clones share the same state.
///
/// ```
/// use limitq_rs::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
///
/// token.reset();
/// assert!(!handle.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
  inner: Arc<Inner>,
}

struct Inner {
  cancelled: AtomicBool,
  notify: Notify,
  waiters: Mutex<Waiters>,
}

#[derive(Default)]
struct Waiters {
  next_id: u64,
  entries: Vec<(u64, Weak<dyn Interruptible>)>,
}

impl CancellationToken {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        cancelled: AtomicBool::new(false),
        notify: Notify::new(),
        waiters: Mutex::new(Waiters::default()),
      }),
    }
  }

  /// Marks the token as cancelled and wakes every operation blocked with it.<br/>
  /// トークンをキャンセル済みにし、このトークンでブロック中の全操作を起こします。
  pub fn cancel(&self) {
    if self.inner.cancelled.swap(true, Ordering::SeqCst) {
      return;
    }
    self.inner.notify.notify_waiters();

    // Wake outside the registry lock: waking takes the queue lock, and a waiter may hold the
    // queue lock while it registers.
    let targets = self
      .waiters()
      .entries
      .iter()
      .filter_map(|(_, target)| target.upgrade())
      .collect::<Vec<_>>();
    tracing::debug!(waiters = targets.len(), "cancellation requested");
    for target in targets {
      target.interrupt_waiters();
    }
  }

  /// Returns whether the token has been cancelled.<br/>
  /// トークンがキャンセル済みかどうかを返します。
  pub fn is_cancelled(&self) -> bool {
    self.inner.cancelled.load(Ordering::SeqCst)
  }

  /// Clears the cancelled status so the token can be used again.<br/>
  /// キャンセル状態を解除し、トークンを再利用可能にします。
  pub fn reset(&self) {
    self.inner.cancelled.store(false, Ordering::SeqCst);
  }

  /// Completes once the token is cancelled.
  pub async fn cancelled(&self) {
    loop {
      let notified = self.inner.notify.notified();
      if self.is_cancelled() {
        return;
      }
      notified.await;
    }
  }

  /// Registers `target` to be woken on cancellation until the returned guard is dropped.
  ///
  /// Callers must re-check [`is_cancelled`](Self::is_cancelled) after registering and before
  /// parking; a cancellation that raced with registration is only visible through the flag.
  pub(crate) fn register(&self, target: Weak<dyn Interruptible>) -> Registration<'_> {
    let mut waiters = self.waiters();
    let id = waiters.next_id;
    waiters.next_id += 1;
    waiters.entries.push((id, target));
    Registration { token: self, id }
  }

  fn waiters(&self) -> MutexGuard<'_, Waiters> {
    self.inner.waiters.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Default for CancellationToken {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for CancellationToken {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancellationToken")
      .field("cancelled", &self.is_cancelled())
      .finish()
  }
}

impl Eq for CancellationToken {}

impl PartialEq for CancellationToken {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

/// Keeps a parked caller registered on a token.
pub(crate) struct Registration<'a> {
  token: &'a CancellationToken,
  id: u64,
}

impl Drop for Registration<'_> {
  fn drop(&mut self) {
    self.token.waiters().entries.retain(|(id, _)| *id != self.id);
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;
  use std::time::Duration;

  use super::*;

  #[derive(Default)]
  struct CountingTarget {
    wakeups: AtomicUsize,
  }

  impl Interruptible for CountingTarget {
    fn interrupt_waiters(&self) {
      self.wakeups.fetch_add(1, Ordering::SeqCst);
    }
  }

  fn registered_count(token: &CancellationToken) -> usize {
    token.waiters().entries.len()
  }

  #[test]
  fn cancel_and_reset() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());

    token.cancel();
    assert!(token.is_cancelled());

    token.reset();
    assert!(!token.is_cancelled());
  }

  #[test]
  fn clones_share_state() {
    let token = CancellationToken::new();
    let cloned = token.clone();
    assert_eq!(token, cloned);
    assert_ne!(token, CancellationToken::new());

    cloned.cancel();
    assert!(token.is_cancelled());
  }

  #[test]
  fn cancel_wakes_registered_targets_once() {
    let token = CancellationToken::new();
    let target = Arc::new(CountingTarget::default());
    let weak: Weak<dyn Interruptible> = Arc::downgrade(&target) as Weak<dyn Interruptible>;

    let registration = token.register(weak);
    token.cancel();
    token.cancel();
    assert_eq!(target.wakeups.load(Ordering::SeqCst), 1);

    drop(registration);
    assert_eq!(registered_count(&token), 0);
  }

  #[test]
  fn dropped_registration_is_not_woken() {
    let token = CancellationToken::new();
    let target = Arc::new(CountingTarget::default());
    let weak: Weak<dyn Interruptible> = Arc::downgrade(&target) as Weak<dyn Interruptible>;

    drop(token.register(weak.clone()));
    let _kept = token.register(weak);
    assert_eq!(registered_count(&token), 1);

    token.cancel();
    assert_eq!(target.wakeups.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn cancelled_future_completes_after_cancel() {
    let token = CancellationToken::new();
    let waiter = {
      let token = token.clone();
      tokio::spawn(async move { token.cancelled().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), waiter)
      .await
      .expect("cancelled() did not complete")
      .unwrap();
  }

  #[tokio::test]
  async fn cancelled_future_is_ready_when_already_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), token.cancelled())
      .await
      .expect("cancelled() did not complete");
  }
}
