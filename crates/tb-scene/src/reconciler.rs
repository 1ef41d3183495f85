use std::sync::Arc;

use futures_util::future::join_all;
use log::{info, warn};

use crate::asset::AssetCache;
use crate::config::SceneConfig;
use crate::error::{ItemFailure, PartialUpdateFailure, UpdateItem};
use crate::node::NodeHandle;
use crate::scene::Scene;
use crate::scheduler::lock_graph;
use crate::store::CharacterChange;
use crate::surface::Surface;
use crate::update::VisualUpdate;

/// What a single [`Reconciler::apply_update`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// The new background node, if the background was replaced.
    pub background: Option<NodeHandle>,
    /// Characters created by this update, in update order.
    pub created: Vec<String>,
    /// Existing characters updated in place.
    pub updated: Vec<String>,
    /// The subset of `updated` whose texture was swapped.
    pub retextured: Vec<String>,
    /// Effect nodes added and scheduled for removal.
    pub effects: Vec<NodeHandle>,
}

/// Applies declarative [`VisualUpdate`]s to a [`Scene`].
///
/// All assets an update references are resolved concurrently; once every
/// resolution has settled the mutations are applied in update order
/// (background, then characters, then effects). A failed asset skips only
/// its own item.
#[derive(Debug, Clone)]
pub struct Reconciler {
    cache: Arc<AssetCache>,
    config: SceneConfig,
}

impl Reconciler {
    /// Create a reconciler resolving assets through `cache`.
    pub fn new(cache: Arc<AssetCache>, config: SceneConfig) -> Self {
        Self { cache, config }
    }

    /// The asset cache.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// The scene tuning in use.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Bring `scene` in line with `update`.
    ///
    /// Characters and the background are never removed implicitly: a
    /// character missing from the update stays where it is. Returns
    /// [`PartialUpdateFailure`] when some items could not be resolved; every
    /// other item has been applied by then.
    pub async fn apply_update<S: Surface>(
        &self,
        scene: &mut Scene<S>,
        update: &VisualUpdate,
    ) -> Result<UpdateReport, PartialUpdateFailure> {
        let background = update.background();
        let characters = update.characters();
        let effects = update.effects();

        let (resolved_background, resolved_characters, resolved_effects) = futures_util::join!(
            async {
                match background {
                    Some(reference) => Some(self.cache.resolve(reference).await),
                    None => None,
                }
            },
            join_all(characters.iter().map(|c| self.cache.resolve(&c.asset_ref))),
            join_all(effects.iter().map(|e| self.cache.resolve(&e.asset_ref))),
        );

        let mut report = UpdateReport::default();
        let mut failures = Vec::new();
        {
            let mut graph = lock_graph(&scene.graph);

            if let (Some(reference), Some(resolved)) = (background, resolved_background) {
                match resolved {
                    Ok(drawable) => {
                        report.background = Some(graph.set_background(
                            reference,
                            &drawable,
                            self.config.background_position(),
                        ));
                    }
                    Err(error) => failures.push(ItemFailure {
                        item: UpdateItem::Background,
                        error,
                    }),
                }
            }

            for (spec, resolved) in characters.iter().zip(resolved_characters) {
                let drawable = match resolved {
                    Ok(drawable) => drawable,
                    Err(error) => {
                        failures.push(ItemFailure {
                            item: UpdateItem::Character(spec.id.clone()),
                            error,
                        });
                        continue;
                    }
                };
                match graph.upsert_character(&spec.id, &spec.asset_ref, &drawable, spec.position)
                {
                    CharacterChange::Created(_) => report.created.push(spec.id.clone()),
                    CharacterChange::Updated { retextured, .. } => {
                        report.updated.push(spec.id.clone());
                        if retextured {
                            report.retextured.push(spec.id.clone());
                        }
                    }
                }
            }

            for (index, (spec, resolved)) in effects.iter().zip(resolved_effects).enumerate() {
                match resolved {
                    Ok(drawable) => {
                        let handle = graph.add_effect(&spec.asset_ref, &drawable, spec.position);
                        scene
                            .effects
                            .schedule(handle, self.config.effect_duration(spec));
                        report.effects.push(handle);
                    }
                    Err(error) => failures.push(ItemFailure {
                        item: UpdateItem::Effect(index),
                        error,
                    }),
                }
            }
        }

        info!(
            "applied visual update: background {}, {} created, {} updated, {} effect(s), {} failed",
            if report.background.is_some() { "replaced" } else { "kept" },
            report.created.len(),
            report.updated.len(),
            report.effects.len(),
            failures.len(),
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            for failure in &failures {
                warn!("skipped {failure}");
            }
            Err(PartialUpdateFailure { failures, report })
        }
    }
}
