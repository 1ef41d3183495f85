use std::collections::HashMap;

use chrono::Utc;
use log::debug;

use crate::asset::Drawable;
use crate::node::{Layer, NodeHandle, NodeIdentity, Position, SceneNode};
use crate::surface::{Surface, ZOrder};

/// Outcome of [`SceneGraph::upsert_character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterChange {
    /// No character with that identity existed; a node was created.
    Created(NodeHandle),
    /// The existing node was updated in place.
    Updated {
        /// The existing node.
        handle: NodeHandle,
        /// Whether its texture had to be swapped.
        retextured: bool,
    },
}

impl CharacterChange {
    /// The handle of the created or updated node.
    pub fn handle(&self) -> NodeHandle {
        match self {
            Self::Created(handle) | Self::Updated { handle, .. } => *handle,
        }
    }
}

/// The scene graph store. Exclusively owns every [`SceneNode`].
///
/// Nodes live on three layers. The background (at most one) is always
/// drawn first; characters and effects follow in creation order and
/// interleave freely. Every mutation is mirrored onto the surface.
#[derive(Debug)]
pub struct SceneGraph<S> {
    surface: S,
    nodes: HashMap<NodeHandle, SceneNode>,

    // Indexes
    background: Option<NodeHandle>,
    characters: HashMap<String, NodeHandle>,
    stacking: Vec<NodeHandle>,

    next_handle: u64,
    next_z: u64,
}

impl<S: Surface> SceneGraph<S> {
    /// Create an empty graph drawing onto `surface`.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            nodes: HashMap::new(),
            background: None,
            characters: HashMap::new(),
            stacking: Vec::new(),
            next_handle: 0,
            next_z: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Replace the background. The previous background is removed first.
    pub fn set_background(
        &mut self,
        asset_ref: &str,
        drawable: &Drawable,
        position: Position,
    ) -> NodeHandle {
        if let Some(old) = self.background.take() {
            self.remove(old);
        }
        let handle = self.insert(NodeIdentity::Background, asset_ref, drawable, position);
        self.background = Some(handle);
        handle
    }

    /// Create the character `id`, or update it in place.
    ///
    /// An existing node keeps its draw order. Its texture is swapped only
    /// when `asset_ref` differs from the current one; its position is always
    /// set.
    pub fn upsert_character(
        &mut self,
        id: &str,
        asset_ref: &str,
        drawable: &Drawable,
        position: Position,
    ) -> CharacterChange {
        let existing = self
            .characters
            .get(id)
            .and_then(|handle| self.nodes.get_mut(handle));

        let Some(node) = existing else {
            let handle = self.insert(
                NodeIdentity::Character(id.to_string()),
                asset_ref,
                drawable,
                position,
            );
            self.characters.insert(id.to_string(), handle);
            self.stacking.push(handle);
            return CharacterChange::Created(handle);
        };

        let retextured = node.asset_ref != asset_ref;
        if retextured {
            debug!("retexturing character {id}: {} -> {asset_ref}", node.asset_ref);
            node.asset_ref = asset_ref.to_string();
            node.drawable = drawable.clone();
            self.surface.set_texture(node.surface_handle, drawable);
        }
        node.position = position;
        self.surface
            .set_position(node.surface_handle, position.x, position.y);

        CharacterChange::Updated {
            handle: node.handle,
            retextured,
        }
    }

    /// Add a fresh anonymous effect node.
    pub fn add_effect(
        &mut self,
        asset_ref: &str,
        drawable: &Drawable,
        position: Position,
    ) -> NodeHandle {
        let handle = self.insert(NodeIdentity::Effect, asset_ref, drawable, position);
        self.stacking.push(handle);
        handle
    }

    /// Remove a node. Returns `false` if the handle is unknown or already
    /// removed; that case is not an error.
    pub fn remove(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.remove(&handle) else {
            debug!("ignoring removal of unknown {handle}");
            return false;
        };

        match &node.identity {
            NodeIdentity::Background => {
                if self.background == Some(handle) {
                    self.background = None;
                }
            }
            NodeIdentity::Character(id) => {
                if self.characters.get(id) == Some(&handle) {
                    self.characters.remove(id);
                }
            }
            NodeIdentity::Effect => {}
        }
        self.stacking.retain(|h| *h != handle);
        self.surface.remove_drawable(node.surface_handle);
        debug!("removed {} {handle} ({})", node.layer(), node.asset_ref);
        true
    }

    /// Remove the character `id`, if present.
    pub fn remove_character(&mut self, id: &str) -> bool {
        match self.characters.get(id).copied() {
            Some(handle) => self.remove(handle),
            None => false,
        }
    }

    fn insert(
        &mut self,
        identity: NodeIdentity,
        asset_ref: &str,
        drawable: &Drawable,
        position: Position,
    ) -> NodeHandle {
        self.next_handle += 1;
        let handle = NodeHandle(self.next_handle);

        let z = if identity == NodeIdentity::Background {
            ZOrder::Background
        } else {
            self.next_z += 1;
            ZOrder::Stacked(self.next_z)
        };
        let surface_handle = self.surface.add_drawable(drawable, z);
        self.surface
            .set_position(surface_handle, position.x, position.y);

        debug!("created {} {handle} ({asset_ref})", identity.layer());
        self.nodes.insert(
            handle,
            SceneNode {
                handle,
                identity,
                asset_ref: asset_ref.to_string(),
                position,
                created_at: Utc::now(),
                drawable: drawable.clone(),
                surface_handle,
            },
        );
        handle
    }
}

impl<S> SceneGraph<S> {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up a node by handle.
    pub fn get(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    /// Whether a node with this handle is present.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// The current background node.
    pub fn background(&self) -> Option<&SceneNode> {
        self.background.and_then(|h| self.nodes.get(&h))
    }

    /// Look up a character by identity.
    pub fn character(&self, id: &str) -> Option<&SceneNode> {
        self.characters.get(id).and_then(|h| self.nodes.get(h))
    }

    /// Nodes in draw order: background first, then characters and effects
    /// in creation order.
    pub fn draw_order(&self) -> impl Iterator<Item = &SceneNode> {
        self.background
            .iter()
            .chain(self.stacking.iter())
            .filter_map(|h| self.nodes.get(h))
    }

    /// All nodes on one layer, in draw order.
    pub fn nodes_in_layer(&self, layer: Layer) -> Vec<&SceneNode> {
        self.draw_order().filter(|n| n.layer() == layer).collect()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The surface the graph draws onto.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::asset::Texture;
    use crate::surface::{RecordingSurface, SurfaceOp};

    fn drawable(reference: &str) -> Drawable {
        Drawable::new(Texture::new(reference, 16, 16))
    }

    fn graph() -> SceneGraph<RecordingSurface> {
        SceneGraph::new(RecordingSurface::new())
    }

    fn set_bg(g: &mut SceneGraph<RecordingSurface>, r: &str) -> NodeHandle {
        g.set_background(r, &drawable(r), Position::new(400.0, 300.0))
    }

    fn upsert(
        g: &mut SceneGraph<RecordingSurface>,
        id: &str,
        r: &str,
        x: f64,
        y: f64,
    ) -> CharacterChange {
        g.upsert_character(id, r, &drawable(r), Position::new(x, y))
    }

    #[test]
    fn background_is_replaced_not_stacked() {
        let mut g = graph();
        let first = set_bg(&mut g, "bg1.png");
        let second = set_bg(&mut g, "bg2.png");

        assert!(!g.contains(first));
        assert_eq!(g.nodes_in_layer(Layer::Background).len(), 1);
        assert_eq!(g.background().unwrap().handle, second);
        assert_eq!(g.background().unwrap().asset_ref, "bg2.png");
        assert_eq!(g.surface().live_count(), 1);
    }

    #[test]
    fn old_background_removed_before_new_one_added() {
        let mut g = graph();
        set_bg(&mut g, "bg1.png");
        set_bg(&mut g, "bg2.png");

        let ops = g.surface().ops();
        let remove = ops
            .iter()
            .position(|op| matches!(op, SurfaceOp::Remove { .. }))
            .unwrap();
        let second_add = ops
            .iter()
            .rposition(|op| matches!(op, SurfaceOp::Add { .. }))
            .unwrap();
        assert!(remove < second_add);
    }

    #[test]
    fn upsert_same_id_updates_in_place() {
        let mut g = graph();
        let created = upsert(&mut g, "hero", "h1.png", 10.0, 20.0);
        let updated = upsert(&mut g, "hero", "h2.png", 30.0, 40.0);

        assert!(matches!(created, CharacterChange::Created(_)));
        assert_eq!(
            updated,
            CharacterChange::Updated {
                handle: created.handle(),
                retextured: true
            }
        );
        let hero = g.character("hero").unwrap();
        assert_eq!(hero.asset_ref, "h2.png");
        assert_eq!(hero.position, Position::new(30.0, 40.0));
        assert_eq!(g.nodes_in_layer(Layer::Character).len(), 1);
    }

    #[test]
    fn unchanged_asset_skips_texture_swap() {
        let mut g = graph();
        let first = drawable("h1.png");
        g.upsert_character("hero", "h1.png", &first, Position::new(10.0, 20.0));
        let change =
            g.upsert_character("hero", "h1.png", &drawable("h1.png"), Position::new(30.0, 40.0));

        assert_eq!(
            change,
            CharacterChange::Updated {
                handle: change.handle(),
                retextured: false
            }
        );
        assert!(g.character("hero").unwrap().drawable().same_resource(&first));
        assert_eq!(
            g.surface()
                .count_ops(|op| matches!(op, SurfaceOp::SetTexture { .. })),
            0
        );
        assert_eq!(
            g.surface().ops().last(),
            Some(&SurfaceOp::SetPosition {
                handle: g.character("hero").unwrap().surface_handle(),
                x: 30.0,
                y: 40.0
            })
        );
    }

    #[test]
    fn updates_keep_draw_order() {
        let mut g = graph();
        upsert(&mut g, "hero", "h.png", 0.0, 0.0);
        g.add_effect("spark.png", &drawable("spark.png"), Position::default());
        upsert(&mut g, "villain", "v.png", 0.0, 0.0);
        upsert(&mut g, "hero", "h2.png", 5.0, 5.0);
        set_bg(&mut g, "bg.png");

        let order: Vec<&str> = g.draw_order().map(|n| n.asset_ref.as_str()).collect();
        assert_eq!(order, vec!["bg.png", "h2.png", "spark.png", "v.png"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut g = graph();
        let fx = g.add_effect("fx.png", &drawable("fx.png"), Position::default());

        assert!(g.remove(fx));
        let ops_after_first = g.surface().ops().len();
        assert!(!g.remove(fx));
        assert!(!g.remove(NodeHandle(999)));

        assert_eq!(g.surface().ops().len(), ops_after_first);
        assert!(g.is_empty());
    }

    #[test]
    fn removed_character_can_be_recreated() {
        let mut g = graph();
        let first = upsert(&mut g, "hero", "h.png", 0.0, 0.0).handle();
        assert!(g.remove_character("hero"));
        assert!(!g.remove_character("hero"));

        let second = upsert(&mut g, "hero", "h.png", 0.0, 0.0);
        assert!(matches!(second, CharacterChange::Created(h) if h != first));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Background(u8),
        Character(u8, u8),
        Effect(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..3).prop_map(Op::Background),
            (0u8..4, 0u8..3).prop_map(|(id, a)| Op::Character(id, a)),
            (0u8..3).prop_map(Op::Effect),
            (0u8..32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn graph_invariants_hold(ops in proptest::collection::vec(op(), 0..60)) {
            let mut g = graph();
            let mut issued: Vec<NodeHandle> = Vec::new();

            for op in ops {
                match op {
                    Op::Background(a) => issued.push(set_bg(&mut g, &format!("bg{a}.png"))),
                    Op::Character(id, a) => {
                        let r = format!("c{a}.png");
                        issued.push(upsert(&mut g, &format!("c{id}"), &r, 1.0, 2.0).handle());
                    }
                    Op::Effect(a) => {
                        let r = format!("fx{a}.png");
                        issued.push(g.add_effect(&r, &drawable(&r), Position::default()));
                    }
                    Op::Remove(i) => {
                        if let Some(h) = issued.get(i as usize) {
                            g.remove(*h);
                        }
                    }
                }

                prop_assert!(g.nodes_in_layer(Layer::Background).len() <= 1);
                let characters = g.nodes_in_layer(Layer::Character);
                let ids: HashSet<&NodeIdentity> = characters.iter().map(|n| &n.identity).collect();
                prop_assert_eq!(ids.len(), characters.len());
                prop_assert_eq!(g.draw_order().count(), g.len());
                prop_assert_eq!(g.surface().live_count(), g.len());
                if g.background().is_some() {
                    prop_assert_eq!(
                        g.draw_order().next().map(|n| n.layer()),
                        Some(Layer::Background)
                    );
                }
            }
        }
    }
}
