use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::RgbaImage;

use crate::{
    error::PlateforgeResult,
    metadata::GenerationRecord,
};

pub const BACKGROUND_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const OVERLAY_EXTENSIONS: &[&str] = &["png"];

/// Image files under `dir` with one of `extensions` (case-insensitive),
/// sorted lexicographically. The sort order is load-bearing: the pipeline's
/// random stream is coupled to enumeration order, so it must be stable across
/// platforms and runs. A missing directory yields an empty list; the pipeline
/// turns that into its no-input error.
pub fn list_images(dir: &Path, extensions: &[&str]) -> PlateforgeResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory '{}'", dir.display()))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| extensions.contains(&e.as_str()));
        if path.is_file() && matches {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

pub fn list_backgrounds(dir: &Path) -> PlateforgeResult<Vec<PathBuf>> {
    list_images(dir, BACKGROUND_EXTENSIONS)
}

pub fn list_overlays(dir: &Path) -> PlateforgeResult<Vec<PathBuf>> {
    list_images(dir, OVERLAY_EXTENSIONS)
}

/// Decode any supported image into RGBA8.
pub fn load_rgba(path: &Path) -> PlateforgeResult<RgbaImage> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

pub fn save_png(img: &RgbaImage, path: &Path) -> PlateforgeResult<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

pub fn save_metadata(record: &GenerationRecord, path: &Path) -> PlateforgeResult<()> {
    ensure_parent_dir(path)?;
    let file = fs::File::create(path)
        .with_context(|| format!("write metadata '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, record)
        .with_context(|| format!("serialize metadata '{}'", path.display()))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> PlateforgeResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

/// Destination for finished images and their metadata records.
///
/// The pipeline never deletes or lists outputs; side effects are strictly
/// additive and each write is independent, so a mid-run failure leaves a
/// valid partial dataset behind.
pub trait DatasetSink {
    fn write(
        &mut self,
        stem: &str,
        img: &RgbaImage,
        record: &GenerationRecord,
    ) -> PlateforgeResult<()>;
}

/// Sink writing `<out>/images/<stem>.png` and `<out>/labels/<stem>.json`.
#[derive(Debug)]
pub struct DirSink {
    image_dir: PathBuf,
    label_dir: PathBuf,
    save_metadata: bool,
}

impl DirSink {
    pub fn new(out_dir: &Path, save_metadata: bool) -> PlateforgeResult<Self> {
        let image_dir = out_dir.join("images");
        let label_dir = out_dir.join("labels");
        fs::create_dir_all(&image_dir)
            .with_context(|| format!("create output dir '{}'", image_dir.display()))?;
        fs::create_dir_all(&label_dir)
            .with_context(|| format!("create output dir '{}'", label_dir.display()))?;
        Ok(Self {
            image_dir,
            label_dir,
            save_metadata,
        })
    }
}

impl DatasetSink for DirSink {
    fn write(
        &mut self,
        stem: &str,
        img: &RgbaImage,
        record: &GenerationRecord,
    ) -> PlateforgeResult<()> {
        save_png(img, &self.image_dir.join(format!("{stem}.png")))?;
        if self.save_metadata {
            save_metadata(record, &self.label_dir.join(format!("{stem}.json")))?;
        }
        Ok(())
    }
}
