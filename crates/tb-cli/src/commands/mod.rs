pub mod play;
pub mod replay;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tb_scene::asset::{FileAssetSource, HttpAssetSource, PlaceholderAssetSource};
use tb_scene::{AssetCache, AssetSource, PartialUpdateFailure, Reconciler, SceneConfig};

/// Where assets come from and how the scene is laid out.
#[derive(Debug, Args)]
pub struct SceneArgs {
    /// Directory to load assets from (placeholders are used when neither this nor --asset-url is given)
    #[arg(short, long, env = "TABLEAU_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Base URL to fetch assets from
    #[arg(long, env = "TABLEAU_ASSET_URL", conflicts_with = "assets")]
    pub asset_url: Option<String>,

    /// Viewport width
    #[arg(long, default_value = "800")]
    pub width: f64,

    /// Viewport height
    #[arg(long, default_value = "600")]
    pub height: f64,

    /// Lifetime of effects that declare none, in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub effect_ms: u64,
}

impl SceneArgs {
    fn asset_source(&self) -> Arc<dyn AssetSource> {
        match (&self.assets, &self.asset_url) {
            (Some(dir), _) => Arc::new(FileAssetSource::new(dir)),
            (None, Some(url)) => Arc::new(HttpAssetSource::new(url)),
            (None, None) => Arc::new(PlaceholderAssetSource),
        }
    }

    fn config(&self) -> SceneConfig {
        SceneConfig::default()
            .with_viewport(self.width, self.height)
            .with_default_effect_duration(Duration::from_millis(self.effect_ms))
    }

    /// Build a reconciler with a fresh asset cache.
    pub fn reconciler(&self) -> Reconciler {
        let cache = AssetCache::new(self.asset_source());
        Reconciler::new(Arc::new(cache), self.config())
    }
}

/// Print the items of a partially applied update that were skipped.
/// Returns how many there were.
pub fn report_failures(prefix: &str, outcome: Result<(), PartialUpdateFailure>) -> usize {
    match outcome {
        Ok(()) => 0,
        Err(partial) => {
            for failure in &partial.failures {
                eprintln!("{prefix}{failure}");
            }
            partial.failures.len()
        }
    }
}
