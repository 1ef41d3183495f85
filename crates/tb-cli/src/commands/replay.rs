//! Headless replay of recorded story turns.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tb_scene::{NodeIdentity, RecordingSurface, Scene, SceneNode, VisualUpdate};
use tb_story::{StoryResponse, render_narrative};

use super::{SceneArgs, report_failures};

/// One entry of a replay file: a full story response or just its visuals.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayTurn {
    Story(StoryResponse),
    Visuals(VisualUpdate),
}

impl ReplayTurn {
    fn visuals(&self) -> Option<&VisualUpdate> {
        match self {
            Self::Story(response) => response.visuals.as_ref(),
            Self::Visuals(update) => Some(update),
        }
    }
}

fn describe(node: &SceneNode) -> String {
    let label = match &node.identity {
        NodeIdentity::Character(id) => format!("character {id}"),
        other => other.layer().to_string(),
    };
    format!("{label} {} at {}", node.asset_ref, node.position)
}

/// Apply every turn of `file` to a recording scene and print what happened.
pub async fn run(
    file: &Path,
    delay: Duration,
    settle: bool,
    scene_args: &SceneArgs,
) -> Result<(), String> {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let turns: Vec<ReplayTurn> = serde_json::from_str(&text)
        .map_err(|e| format!("invalid replay file {}: {e}", file.display()))?;

    let reconciler = scene_args.reconciler();
    let mut scene = Scene::new(RecordingSurface::new());
    let mut failed = 0;

    for (index, turn) in turns.iter().enumerate() {
        if let ReplayTurn::Story(response) = turn {
            println!("{}", render_narrative(&response.narrative));
        }
        if let Some(visuals) = turn.visuals() {
            let outcome = reconciler.apply_update(&mut scene, visuals).await;
            failed += report_failures(&format!("turn {}: ", index + 1), outcome.map(|_| ()));
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if settle {
        while scene.effects().pending_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    {
        let graph = scene.graph();
        println!("-- surface operations --");
        for op in graph.surface().ops() {
            println!("{op}");
        }
        println!("-- draw order --");
        for node in graph.draw_order() {
            println!("{}", describe(node));
        }
    }
    println!("-- {} effect(s) pending --", scene.effects().pending_count());

    scene.teardown().await;

    if failed > 0 {
        Err(format!("{failed} scene item(s) could not be loaded"))
    } else {
        Ok(())
    }
}
