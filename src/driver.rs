//! # Render Driver
//!
//! Drives the generate / finalize / render / export cycle against an
//! engine backend. A scene script is invoked with a fresh [`Scene`] per
//! image; the driver owns everything around that call: clearing leftover
//! state, pushing the finished scene to the engine, rendering, and writing
//! the metadata sidecar next to the image files.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::engine::Engine;
use crate::scene::Scene;

/// Filename of the metadata sidecar written into each run directory.
pub const META_FILENAME: &str = "_meta.json";

/// Initialize logging from the `RUST_LOG` environment variable.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// A procedural scene generator.
///
/// Implemented for free by any `FnMut(&mut Scene) -> Result<()>` closure;
/// implement the trait directly when the generator carries state (an RNG,
/// an asset catalog) across renders.
pub trait SceneScript {
    fn generate(&mut self, scene: &mut Scene) -> crate::Result<()>;
}

impl<F> SceneScript for F
where
    F: FnMut(&mut Scene) -> crate::Result<()>,
{
    fn generate(&mut self, scene: &mut Scene) -> crate::Result<()> {
        self(scene)
    }
}

/// Generate and render one image.
///
/// With an output directory the render writes image files into a fresh
/// run subdirectory, followed by the metadata sidecar, and the run
/// directory's path is returned. Without one the scene is still generated
/// and pushed to the engine (keeping an interactive viewport current) but
/// no render is invoked and nothing touches the filesystem.
pub fn render_once<E, S>(
    engine: &mut E,
    script: &mut S,
    output_dir: Option<&Path>,
) -> anyhow::Result<Option<PathBuf>>
where
    E: Engine + ?Sized,
    S: SceneScript + ?Sized,
{
    engine.clear();

    let mut scene = Scene::new(output_dir.map(Path::to_path_buf));
    script
        .generate(&mut scene)
        .context("scene script failed")?;
    scene.finalize(engine).context("scene finalization failed")?;

    let Some(dir) = output_dir else {
        return Ok(None);
    };

    engine.render(true).context("render failed")?;
    scene
        .save_metadata(META_FILENAME)
        .context("metadata export failed")?;

    // finalize() assigned the run dir when output_dir is set
    let run = scene.run_dir().ok_or_else(|| {
        anyhow::anyhow!("finalized scene is missing its run directory")
    })?;
    Ok(Some(dir.join(run)))
}

/// Generate and render a batch of images, one run directory each.
///
/// The script sees a fresh scene per image, so per-image randomization
/// belongs inside `generate`. Stops at the first failed image.
pub fn render_batch<E, S>(
    engine: &mut E,
    script: &mut S,
    output_dir: &Path,
    count: usize,
) -> anyhow::Result<Vec<PathBuf>>
where
    E: Engine + ?Sized,
    S: SceneScript + ?Sized,
{
    let mut runs = Vec::with_capacity(count);
    for i in 0..count {
        log::info!("rendering image {} of {count}", i + 1);
        let run = render_once(engine, script, Some(output_dir))?
            .ok_or_else(|| anyhow::anyhow!("render produced no run directory"))?;
        runs.push(run);
    }
    Ok(runs)
}
