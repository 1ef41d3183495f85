use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::task::{AbortHandle, JoinSet};
use tokio::time::Instant;

use crate::node::NodeHandle;
use crate::store::SceneGraph;
use crate::surface::Surface;

/// Lock a shared graph, recovering from a poisoned mutex.
pub(crate) fn lock_graph<S>(graph: &Mutex<SceneGraph<S>>) -> MutexGuard<'_, SceneGraph<S>> {
    graph.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stand-in expiry for durations too long to represent as an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug)]
struct PendingEffect {
    expires_at: Instant,
    timer: AbortHandle,
}

/// Retires effect nodes once their lifetime has elapsed.
///
/// Each scheduled handle gets its own timer task. When the timer fires the
/// node is removed from the graph; if something else removed it first, the
/// removal is a no-op. The timer set is owned by the scheduler: dropping the
/// scheduler aborts every pending timer, so no timer outlives its scene.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct EffectScheduler<S> {
    graph: Arc<Mutex<SceneGraph<S>>>,
    timers: JoinSet<NodeHandle>,
    pending: HashMap<NodeHandle, PendingEffect>,
}

impl<S: Surface> EffectScheduler<S> {
    /// Create a scheduler that removes expired effects from `graph`.
    pub fn new(graph: Arc<Mutex<SceneGraph<S>>>) -> Self {
        Self {
            graph,
            timers: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Arm a timer that removes `handle` after `duration`.
    ///
    /// Scheduling a handle that is already pending re-arms it.
    pub fn schedule(&mut self, handle: NodeHandle, duration: Duration) {
        self.reap();
        if let Some(previous) = self.pending.remove(&handle) {
            previous.timer.abort();
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(duration)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        let graph = Arc::clone(&self.graph);
        let timer = self.timers.spawn(async move {
            tokio::time::sleep(duration).await;
            if lock_graph(&graph).remove(handle) {
                debug!("effect {handle} expired");
            }
            handle
        });
        self.pending.insert(
            handle,
            PendingEffect {
                expires_at,
                timer,
            },
        );
    }

    /// Effects still waiting to expire, soonest first.
    pub fn pending(&mut self) -> Vec<(NodeHandle, Instant)> {
        self.reap();
        let mut pending: Vec<(NodeHandle, Instant)> = self
            .pending
            .iter()
            .filter(|(_, p)| !p.timer.is_finished())
            .map(|(h, p)| (*h, p.expires_at))
            .collect();
        pending.sort_by_key(|(h, at)| (*at, *h));
        pending
    }

    /// Number of effects still waiting to expire.
    pub fn pending_count(&mut self) -> usize {
        self.pending().len()
    }

    /// Whether `handle` is still waiting to expire.
    pub fn is_pending(&mut self, handle: NodeHandle) -> bool {
        self.reap();
        self.pending
            .get(&handle)
            .is_some_and(|p| !p.timer.is_finished())
    }

    /// Abort every pending timer without removing its node.
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            debug!("cancelling {} pending effect timer(s)", self.pending.len());
        }
        self.timers.abort_all();
        self.pending.clear();
    }

    /// Abort every pending timer and wait until all of them have stopped.
    pub async fn shutdown(&mut self) {
        self.pending.clear();
        self.timers.shutdown().await;
    }

    fn reap(&mut self) {
        while let Some(done) = self.timers.try_join_next() {
            if let Ok(handle) = done {
                self.pending.remove(&handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Drawable, Texture};
    use crate::node::Position;
    use crate::surface::RecordingSurface;

    fn shared_graph() -> Arc<Mutex<SceneGraph<RecordingSurface>>> {
        Arc::new(Mutex::new(SceneGraph::new(RecordingSurface::new())))
    }

    fn add_effect(graph: &Mutex<SceneGraph<RecordingSurface>>) -> NodeHandle {
        let drawable = Drawable::new(Texture::new("fx.png", 1, 1));
        lock_graph(graph).add_effect("fx.png", &drawable, Position::default())
    }

    #[tokio::test(start_paused = true)]
    async fn effect_removed_after_duration() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let fx = add_effect(&graph);

        scheduler.schedule(fx, Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(lock_graph(&graph).contains(fx));
        assert!(scheduler.is_pending(fx));

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert!(!lock_graph(&graph).contains(fx));
        assert!(!scheduler.is_pending(fx));
    }

    #[tokio::test(start_paused = true)]
    async fn already_removed_effect_is_skipped() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let fx = add_effect(&graph);
        scheduler.schedule(fx, Duration::from_millis(100));

        assert!(lock_graph(&graph).remove(fx));
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        let removals = lock_graph(&graph)
            .surface()
            .count_ops(|op| matches!(op, crate::surface::SurfaceOp::Remove { .. }));
        assert_eq!(removals, 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_lists_soonest_first() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let slow = add_effect(&graph);
        let fast = add_effect(&graph);
        scheduler.schedule(slow, Duration::from_millis(900));
        scheduler.schedule(fast, Duration::from_millis(100));

        let order: Vec<NodeHandle> = scheduler.pending().into_iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![fast, slow]);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_duration_stays_pending() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let fx = add_effect(&graph);
        let soon = add_effect(&graph);

        scheduler.schedule(fx, Duration::MAX);
        scheduler.schedule(soon, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;

        assert!(lock_graph(&graph).contains(fx));
        assert!(!lock_graph(&graph).contains(soon));
        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, fx);
        scheduler.cancel_all();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_scheduler_cancels_timers() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let fx = add_effect(&graph);
        scheduler.schedule(fx, Duration::from_millis(100));

        drop(scheduler);
        tokio::time::sleep(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;

        assert!(lock_graph(&graph).contains(fx));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_cancellation() {
        let graph = shared_graph();
        let mut scheduler = EffectScheduler::new(Arc::clone(&graph));
        let fx = add_effect(&graph);
        scheduler.schedule(fx, Duration::from_millis(100));

        scheduler.shutdown().await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(lock_graph(&graph).contains(fx));
        assert_eq!(scheduler.pending_count(), 0);
    }
}
