use std::time::Duration;

use limitq_rs::{AsyncArrayBlockingQueue, CancellationToken, QueueError};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Job {
  id: usize,
  cost: Duration,
}

async fn worker(name: usize, jobs: AsyncArrayBlockingQueue<Job>, shutdown: CancellationToken) -> usize {
  let mut done = 0;
  loop {
    match jobs.take(&shutdown).await {
      Ok(job) => {
        sleep(job.cost).await;
        tracing::info!(worker = name, job = job.id, "job finished");
        done += 1;
      }
      Err(QueueError::PollInterrupted) => break,
      Err(err) => {
        tracing::warn!(worker = name, %err, "unexpected queue error");
        break;
      }
    }
  }
  done
}

#[tokio::main]
async fn main() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .try_init();

  let jobs = AsyncArrayBlockingQueue::new(4);
  let shutdown = CancellationToken::new();

  let workers = (0..3)
    .map(|name| tokio::spawn(worker(name, jobs.clone(), shutdown.clone())))
    .collect::<Vec<_>>();

  // Submission slows down to the pace of the workers once four jobs are pending.
  let submit = CancellationToken::new();
  for id in 0..20 {
    let job = Job {
      id,
      cost: Duration::from_millis(20 + (id as u64 % 5) * 10),
    };
    match jobs.put_timeout(job, Duration::from_secs(1), &submit).await {
      Ok(()) => tracing::info!(job = id, pending = jobs.len().await, "job submitted"),
      Err(err) => tracing::warn!(job = id, %err, "job rejected"),
    }
  }

  while jobs.len().await > 0 {
    sleep(Duration::from_millis(10)).await;
  }
  sleep(Duration::from_millis(100)).await;
  shutdown.cancel();

  let mut total = 0;
  for handle in workers {
    total += handle.await.unwrap_or_default();
  }
  tracing::info!(total, "all workers stopped");
}
