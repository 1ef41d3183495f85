use std::sync::{Arc, Mutex, MutexGuard};

use crate::scheduler::{EffectScheduler, lock_graph};
use crate::store::SceneGraph;
use crate::surface::Surface;

/// A live scene: the graph store plus the timers retiring its effects.
///
/// The caller owns the scene and passes it to
/// [`Reconciler::apply_update`](crate::Reconciler::apply_update) once per
/// story turn. Dropping the scene cancels every pending effect timer.
#[derive(Debug)]
pub struct Scene<S> {
    pub(crate) graph: Arc<Mutex<SceneGraph<S>>>,
    pub(crate) effects: EffectScheduler<S>,
}

impl<S: Surface> Scene<S> {
    /// Create an empty scene drawing onto `surface`.
    pub fn new(surface: S) -> Self {
        let graph = Arc::new(Mutex::new(SceneGraph::new(surface)));
        let effects = EffectScheduler::new(Arc::clone(&graph));
        Self { graph, effects }
    }

    /// Lock the graph for inspection or direct mutation.
    ///
    /// Effect timers wait for the lock, so do not hold the guard across an
    /// `.await`.
    pub fn graph(&self) -> MutexGuard<'_, SceneGraph<S>> {
        lock_graph(&self.graph)
    }

    /// The effect scheduler.
    pub fn effects(&mut self) -> &mut EffectScheduler<S> {
        &mut self.effects
    }

    /// Cancel all pending effect timers and wait for them to stop.
    ///
    /// Effects that were still on screen stay in the graph.
    pub async fn teardown(&mut self) {
        self.effects.shutdown().await;
    }
}
