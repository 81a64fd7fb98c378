//! Single-slot task timer.
//!
//! A [`Timer`] owns at most one live task. Arming it aborts whatever task was
//! there before, and a generation counter keeps a task that already woke up
//! from acting after it was replaced.
//!
//! Arming spawns onto the current tokio runtime, so it must be called from
//! within one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct TimerState {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Default)]
pub struct Timer {
    state: Arc<Mutex<TimerState>>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` after `delay`, replacing any previously armed task.
    pub fn arm<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.lock();
        if let Some(handle) = state.handle.take() {
            handle.abort();
        }
        state.generation += 1;
        let generation = state.generation;

        let shared = Arc::clone(&self.state);
        state.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.lock().generation != generation {
                return;
            }
            task.await;
            let mut state = shared.lock();
            if state.generation == generation {
                state.handle = None;
            }
        }));
    }

    /// Aborts the armed task, if any.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        if let Some(handle) = state.handle.take() {
            handle.abort();
        }
    }

    /// Whether a task is waiting or running.
    pub fn is_armed(&self) -> bool {
        self.state
            .lock()
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_task(counter: &Arc<AtomicUsize>, amount: usize) -> impl Future<Output = ()> {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(amount, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let timer = Timer::new();
        let counter = Arc::new(AtomicUsize::new(0));
        timer.arm(Duration::from_millis(200), counting_task(&counter, 1));
        assert!(timer.is_armed());

        sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_pending_task() {
        let timer = Timer::new();
        let counter = Arc::new(AtomicUsize::new(0));
        timer.arm(Duration::from_millis(200), counting_task(&counter, 1));
        sleep(Duration::from_millis(100)).await;
        timer.arm(Duration::from_millis(200), counting_task(&counter, 10));

        sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_task() {
        let timer = Timer::new();
        let counter = Arc::new(AtomicUsize::new(0));
        timer.arm(Duration::from_millis(200), counting_task(&counter, 1));
        timer.cancel();
        assert!(!timer.is_armed());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_the_slot() {
        let timer = Timer::new();
        let other = timer.clone();
        let counter = Arc::new(AtomicUsize::new(0));
        timer.arm(Duration::from_secs(1), counting_task(&counter, 1));
        assert!(other.is_armed());
        other.cancel();

        sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
