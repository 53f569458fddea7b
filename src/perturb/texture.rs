use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_line_segment_mut};
use rand::{Rng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

use crate::{
    error::PlateforgeResult,
    metadata::PerturbationRecord,
    perturb::{Perturbation, PerturbationKind, parse_params, record_for},
    region::{Region, Scope},
};

const NAME: &str = "texture";

pub fn kind() -> PerturbationKind {
    PerturbationKind {
        name: NAME,
        summary: "plate-surface textures: film grain, scratches or dirt spots",
        build: |params| {
            Ok(Box::new(TexturePerturbation {
                params: parse_params(NAME, params)?,
            }))
        },
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextureParams {
    /// Texture sub-type: `grain`, `scratches` or `dirt`. Anything else makes
    /// the operator a silent no-op.
    #[serde(rename = "type")]
    pub kind: String,
    pub intensity: f32,
    /// Accepted but ignored: texture is modeled as a plate-surface effect and
    /// always stays inside the overlay box.
    pub scope: Scope,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            kind: "grain".to_string(),
            intensity: 0.3,
            scope: Scope::Region,
        }
    }
}

/// Surface textures confined to the overlay region.
#[derive(Clone, Debug)]
pub struct TexturePerturbation {
    params: TextureParams,
}

impl TexturePerturbation {
    pub fn new(params: TextureParams) -> Self {
        Self { params }
    }

    fn apply_grain(
        &self,
        mut img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        let sigma = f64::from(self.params.intensity) * 255.0;
        let Ok(grain) = Normal::new(0.0, sigma) else {
            // Negative or non-finite sigma; silent per the failure policy.
            return Ok(img);
        };

        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let px = img.get_pixel_mut(x, y);
                for c in &mut px.0[..3] {
                    let v = f64::from(*c) + grain.sample(rng);
                    *c = v.clamp(0.0, 255.0) as u8;
                }
            }
        }
        Ok(img)
    }

    fn apply_scratches(
        &self,
        mut img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        if region.width == 0 || region.height == 0 {
            return Ok(img);
        }
        let count = (self.params.intensity * 20.0) as i32;
        let alpha = (self.params.intensity * 128.0).clamp(0.0, 255.0) as u8;

        let mut layer = RgbaImage::new(img.width(), img.height());
        for _ in 0..count.max(0) {
            let sx1 = rng.random_range(region.x..region.right()) as i32;
            let sy1 = rng.random_range(region.y..region.bottom()) as i32;
            let sx2 = (sx1 + rng.random_range(-20..=20)).clamp(region.x as i32, region.right() as i32);
            let sy2 = (sy1 + rng.random_range(-20..=20)).clamp(region.y as i32, region.bottom() as i32);

            draw_line_segment_mut(
                &mut layer,
                (sx1 as f32, sy1 as f32),
                (sx2 as f32, sy2 as f32),
                Rgba([0, 0, 0, alpha]),
            );
        }
        imageops::overlay(&mut img, &layer, 0, 0);
        Ok(img)
    }

    fn apply_dirt(
        &self,
        mut img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        let count = (self.params.intensity * 15.0) as i32;
        let alpha = (self.params.intensity * 100.0).clamp(0.0, 255.0) as u8;

        let mut layer = RgbaImage::new(img.width(), img.height());
        for _ in 0..count.max(0) {
            // Spots anchor inside the box but their extent may spill a few
            // pixels past the right/bottom edge, matching the anchor-based
            // placement contract.
            let hi_x = region.right().saturating_sub(5).max(region.x);
            let hi_y = region.bottom().saturating_sub(5).max(region.y);
            let spot_x = rng.random_range(region.x..=hi_x) as i32;
            let spot_y = rng.random_range(region.y..=hi_y) as i32;
            let size = rng.random_range(2..=8i32);

            let fill = Rgba([
                rng.random_range(20..=60u8),
                rng.random_range(20..=60u8),
                rng.random_range(20..=60u8),
                alpha,
            ]);
            let r = (size / 2).max(1);
            draw_filled_ellipse_mut(&mut layer, (spot_x + r, spot_y + r), r, r, fill);
        }
        imageops::overlay(&mut img, &layer, 0, 0);
        Ok(img)
    }
}

impl Perturbation for TexturePerturbation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(
        &self,
        img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        match self.params.kind.as_str() {
            "grain" => self.apply_grain(img, region, rng),
            "scratches" => self.apply_scratches(img, region, rng),
            "dirt" => self.apply_dirt(img, region, rng),
            // Unrecognized sub-types pass the image through untouched.
            _ => Ok(img),
        }
    }

    fn record(&self) -> PerturbationRecord {
        record_for(NAME, &self.params)
    }
}
