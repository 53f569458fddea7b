use std::path::{Path, PathBuf};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    composite::composite_centered,
    config::OperatorConfig,
    error::{PlateforgeError, PlateforgeResult},
    io::{self, DatasetSink},
    metadata::GenerationRecord,
    perturb::PerturbationRegistry,
};

/// Counters reported by a finished [`DatasetPipeline::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub images_written: u64,
    pub inputs_skipped: u64,
}

/// The generation orchestrator: enumerates background/overlay pairs,
/// composites them, threads each composite through the configured operator
/// chain and hands the result plus its metadata record to the sink.
///
/// When a seed is set, the shared RNG is seeded exactly once per `run`, so
/// identical inputs and configuration reproduce bit-identical outputs. The
/// random stream is coupled to enumeration order, which `io::list_images`
/// keeps lexicographic for that reason.
#[derive(Debug)]
pub struct DatasetPipeline<'r> {
    registry: &'r PerturbationRegistry,
    background_dir: PathBuf,
    overlay_dir: PathBuf,
    chain: Vec<OperatorConfig>,
    seed: Option<u64>,
}

impl<'r> DatasetPipeline<'r> {
    pub fn new(
        registry: &'r PerturbationRegistry,
        background_dir: impl Into<PathBuf>,
        overlay_dir: impl Into<PathBuf>,
        chain: Vec<OperatorConfig>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            registry,
            background_dir: background_dir.into(),
            overlay_dir: overlay_dir.into(),
            chain,
            seed,
        }
    }

    /// Generate `n_variants` perturbed images per background/overlay pair.
    ///
    /// Produces exactly `backgrounds * overlays * n_variants` outputs when all
    /// inputs decode. Unreadable input files are skipped with a warning; any
    /// error past compositing (unknown operator, sink failure) aborts the run,
    /// leaving already-written outputs in place.
    #[tracing::instrument(skip(self, sink), fields(variants = n_variants))]
    pub fn run(&self, n_variants: u32, sink: &mut dyn DatasetSink) -> PlateforgeResult<RunStats> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let backgrounds = io::list_backgrounds(&self.background_dir)?;
        if backgrounds.is_empty() {
            return Err(PlateforgeError::no_input_images(
                "background",
                &self.background_dir,
            ));
        }
        let overlays = io::list_overlays(&self.overlay_dir)?;
        if overlays.is_empty() {
            return Err(PlateforgeError::no_input_images("overlay", &self.overlay_dir));
        }

        let mut stats = RunStats::default();
        for bg_path in &backgrounds {
            let bg = match io::load_rgba(bg_path) {
                Ok(img) => img,
                Err(e) => {
                    tracing::warn!(path = %bg_path.display(), error = %e, "skipping background");
                    stats.inputs_skipped += 1;
                    continue;
                }
            };

            for ov_path in &overlays {
                let overlay = match io::load_rgba(ov_path) {
                    Ok(img) => img,
                    Err(e) => {
                        tracing::warn!(path = %ov_path.display(), error = %e, "skipping overlay");
                        stats.inputs_skipped += 1;
                        continue;
                    }
                };

                for variant in 0..n_variants {
                    let (mut img, region) = composite_centered(&bg, &overlay)?;

                    let mut applied = Vec::with_capacity(self.chain.len());
                    for conf in &self.chain {
                        // Fresh operator per application; no state crosses images.
                        let op = self.registry.build(&conf.name, &conf.params)?;
                        img = op.apply(img, region, &mut rng)?;
                        applied.push(op.record());
                    }

                    let stem = output_stem(bg_path, ov_path, variant);
                    let record = GenerationRecord {
                        background: file_name(bg_path),
                        overlay: file_name(ov_path),
                        overlay_position: [region.x, region.y],
                        overlay_size: [region.width, region.height],
                        perturbations: applied,
                        random_seed: self.seed,
                        variant_index: variant,
                    };
                    sink.write(&stem, &img, &record)?;
                    stats.images_written += 1;
                    tracing::debug!(stem, total = stats.images_written, "generated image");
                }
            }
        }

        tracing::info!(
            images = stats.images_written,
            skipped = stats.inputs_skipped,
            "dataset generation complete"
        );
        Ok(stats)
    }
}

/// Deterministic output name: `{background-stem}_{overlay-stem}_{variant:03}`.
/// Collisions between distinct inputs are accepted, last write wins.
fn output_stem(bg: &Path, ov: &Path, variant: u32) -> String {
    format!("{}_{}_{variant:03}", stem(bg), stem(ov))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
