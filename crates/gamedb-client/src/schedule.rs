//! Single-owner delayed tasks.
//!
//! A `ScheduledTask` runs a future once after a delay. Dropping the handle
//! aborts the task, so whoever holds it in an `Option` slot can never have two
//! live tasks: replacing the slot cancels the previous one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one scheduled task, handed to its body so it can recognise
/// itself in its owner's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
pub struct ScheduledTask {
    id: TaskId,
    delay: Duration,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `body` on the current tokio runtime, to run after `delay`.
    pub fn after<F, Fut>(delay: Duration, body: F) -> Self
    where
        F: FnOnce(TaskId) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed));
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            body(id).await;
        });
        Self {
            id,
            delay,
            handle: Some(handle),
        }
    }

    pub const fn id(&self) -> TaskId {
        self.id
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Abort the task if it has not run yet (or stop it mid-run).
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Release ownership without aborting; the task runs to completion.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &Arc<AtomicUsize>, delay: Duration) -> ScheduledTask {
        let counter = Arc::clone(counter);
        ScheduledTask::after(delay, move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = counting(&counter, Duration::from_secs(30));
        assert_eq!(task.delay(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_aborts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut slot = Some(counting(&counter, Duration::from_secs(5)));
        slot = None;
        assert!(slot.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_slot_leaves_one_live_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut slot = Some(counting(&counter, Duration::from_secs(5)));
        let first = slot.as_ref().map(ScheduledTask::id);
        slot = Some(counting(&counter, Duration::from_secs(5)));
        assert_ne!(first, slot.as_ref().map(ScheduledTask::id));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_and_detach_keeps_running() {
        let counter = Arc::new(AtomicUsize::new(0));
        counting(&counter, Duration::from_secs(1)).cancel();
        counting(&counter, Duration::from_secs(1)).detach();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
