use image::RgbaImage;
use rand::{Rng, rngs::StdRng};

use crate::{
    error::PlateforgeResult,
    metadata::PerturbationRecord,
    perturb::{Perturbation, PerturbationKind, parse_params, record_for},
    region::{Region, Scope, map_scoped},
};

const NAME: &str = "noise";

pub fn kind() -> PerturbationKind {
    PerturbationKind {
        name: NAME,
        summary: "per-pixel uniform additive noise, like sensor noise or compression artifacts",
        build: |params| {
            Ok(Box::new(NoisePerturbation {
                params: parse_params(NAME, params)?,
            }))
        },
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub intensity: i32,
    pub scope: Scope,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            intensity: 15,
            scope: Scope::Region,
        }
    }
}

/// Uniform noise in `[-intensity, +intensity)` added per channel, clamped to
/// `[0, 255]`. The alpha channel is left alone.
#[derive(Clone, Debug)]
pub struct NoisePerturbation {
    params: NoiseParams,
}

impl NoisePerturbation {
    pub fn new(params: NoiseParams) -> Self {
        Self { params }
    }
}

impl Perturbation for NoisePerturbation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(
        &self,
        img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        let intensity = self.params.intensity;
        if intensity <= 0 {
            return Ok(img);
        }

        map_scoped(img, region, self.params.scope, |mut target| {
            for px in target.pixels_mut() {
                for c in &mut px.0[..3] {
                    // Widen before adding; clamp before narrowing back. i64
                    // keeps the sum in range even for intensities near i32::MAX.
                    let v = i64::from(*c) + i64::from(rng.random_range(-intensity..intensity));
                    *c = v.clamp(0, 255) as u8;
                }
            }
            Ok(target)
        })
    }

    fn record(&self) -> PerturbationRecord {
        record_for(NAME, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::SeedableRng;

    fn gray(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([128, 128, 128, 255]))
    }

    fn op(params: serde_json::Value) -> Box<dyn Perturbation> {
        (kind().build)(&params).unwrap()
    }

    #[test]
    fn extreme_intensity_never_wraps() {
        let img = gray(16, 16);
        let op = op(serde_json::json!({ "intensity": 100_000, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(3);
        let out = op.apply(img, Region::new(0, 0, 16, 16), &mut rng).unwrap();
        // u8 storage makes the range bound structural; the hazard is
        // wraparound during the widened add, which shows up as banding at
        // the extremes rather than a panic.
        let extremes = out
            .pixels()
            .filter(|p| p.0[0] == 0 || p.0[0] == 255)
            .count();
        assert!(extremes > 0);
    }

    #[test]
    fn maximum_intensity_never_overflows_the_add() {
        let img = gray(8, 8);
        let op = op(serde_json::json!({ "intensity": i32::MAX, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(19);
        let out = op.apply(img, Region::new(0, 0, 8, 8), &mut rng).unwrap();
        // Deltas near i32::MAX drive every channel to an extreme.
        assert!(out.pixels().all(|p| p.0[..3].iter().all(|&c| c == 0 || c == 255)));
    }

    #[test]
    fn region_scope_confines_the_noise() {
        let img = gray(30, 20);
        let region = Region::new(10, 5, 8, 6);
        let op = op(serde_json::json!({ "intensity": 60 }));
        let mut rng = StdRng::seed_from_u64(11);
        let out = op.apply(img.clone(), region, &mut rng).unwrap();

        let mut inside_changed = false;
        for (x, y, px) in out.enumerate_pixels() {
            if region.contains(x, y) {
                inside_changed |= px.0 != [128, 128, 128, 255];
            } else {
                assert_eq!(px, img.get_pixel(x, y), "pixel outside region changed");
            }
        }
        assert!(inside_changed);
    }

    #[test]
    fn global_scope_reaches_outside_the_region() {
        let img = gray(30, 20);
        let region = Region::new(10, 5, 8, 6);
        let op = op(serde_json::json!({ "intensity": 60, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(11);
        let out = op.apply(img, region, &mut rng).unwrap();

        let outside_changed = out
            .enumerate_pixels()
            .any(|(x, y, px)| !region.contains(x, y) && px.0 != [128, 128, 128, 255]);
        assert!(outside_changed);
    }

    #[test]
    fn alpha_channel_is_untouched() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([50, 60, 70, 200]));
        let op = op(serde_json::json!({ "intensity": 80, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(2);
        let out = op.apply(img.clone(), Region::full(&img), &mut rng).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 200));
    }

    #[test]
    fn non_positive_intensity_is_a_noop() {
        let img = gray(8, 8);
        let op = op(serde_json::json!({ "intensity": 0 }));
        let mut rng = StdRng::seed_from_u64(1);
        let out = op.apply(img.clone(), Region::full(&img), &mut rng).unwrap();
        assert_eq!(out, img);
    }
}
