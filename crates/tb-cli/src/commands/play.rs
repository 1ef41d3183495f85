//! The interactive command loop.

use std::time::Duration;

use colored::Colorize;
use tb_scene::{LogSurface, Scene};
use tb_story::{HttpStoryClient, StoryConfig, StorySession, render_narrative};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{SceneArgs, report_failures};

/// Shown when a story turn fails for any reason.
const CONNECTION_ERROR: &str =
    "Error connecting to the story engine. Please check the console and try again.";

/// Read commands from stdin until EOF, one story turn per line.
pub async fn run(endpoint: &str, timeout: Duration, scene_args: &SceneArgs) -> Result<(), String> {
    let config = StoryConfig::default()
        .with_endpoint(endpoint)
        .with_timeout(timeout);
    let client = HttpStoryClient::new(&config).map_err(|e| e.to_string())?;
    let mut session = StorySession::new(client, &config);
    let reconciler = scene_args.reconciler();
    let mut scene = Scene::new(LogSurface::new());

    println!("{}", render_narrative(session.opening()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("cannot read input: {e}"))?
    {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        println!("{}", format!("> {command}").dimmed());
        println!("{}", "thinking...".yellow());

        match session.submit(command).await {
            Ok(Some(turn)) => {
                println!("{}", render_narrative(&turn.narrative));
                if let Some(visuals) = &turn.visuals {
                    let outcome = reconciler.apply_update(&mut scene, visuals).await;
                    report_failures("scene: ", outcome.map(|_| ()));
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::error!("error calling story service: {err}");
                println!("{}", CONNECTION_ERROR.red());
            }
        }
    }

    scene.teardown().await;
    Ok(())
}
