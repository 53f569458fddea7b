use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;

use crate::{
    error::PlateforgeResult,
    metadata::PerturbationRecord,
    perturb::{Perturbation, PerturbationKind, parse_params, record_for},
    region::{Region, Scope, map_scoped},
};

const NAME: &str = "warp";

pub fn kind() -> PerturbationKind {
    PerturbationKind {
        name: NAME,
        summary: "mild sinusoidal geometric warp with bilinear resampling",
        build: |params| {
            Ok(Box::new(WarpPerturbation {
                params: parse_params(NAME, params)?,
            }))
        },
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WarpParams {
    pub intensity: f32,
    pub frequency: f32,
    pub scope: Scope,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            intensity: 5.0,
            frequency: 20.0,
            scope: Scope::Region,
        }
    }
}

/// Dense sinusoidal displacement field resampled bilinearly. Displaced
/// coordinates are clamped to the target's index range, so output dimensions
/// always equal input dimensions.
#[derive(Clone, Debug)]
pub struct WarpPerturbation {
    params: WarpParams,
}

impl WarpPerturbation {
    pub fn new(params: WarpParams) -> Self {
        Self { params }
    }
}

impl Perturbation for WarpPerturbation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(
        &self,
        img: RgbaImage,
        region: Region,
        _rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        let WarpParams {
            intensity,
            frequency,
            scope,
        } = self.params;
        // Degenerate frequency would put NaN into the field; treat as no-op.
        if !intensity.is_finite() || !frequency.is_finite() || frequency <= 0.0 {
            return Ok(img);
        }

        map_scoped(img, region, scope, |target| {
            Ok(warp_buffer(&target, intensity, frequency))
        })
    }

    fn record(&self) -> PerturbationRecord {
        record_for(NAME, &self.params)
    }
}

fn warp_buffer(src: &RgbaImage, intensity: f32, frequency: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut out = RgbaImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let max_x = (w - 1) as f32;
    let max_y = (h - 1) as f32;
    for y in 0..h {
        let dx = (y as f32 / frequency).sin() * intensity;
        for x in 0..w {
            let dy = (x as f32 / frequency).cos() * intensity;
            let sx = (x as f32 + dx).clamp(0.0, max_x);
            let sy = (y as f32 + dy).clamp(0.0, max_y);
            out.put_pixel(x, y, sample_bilinear(src, sx, sy));
        }
    }
    out
}

fn sample_bilinear(src: &RgbaImage, fx: f32, fy: f32) -> Rgba<u8> {
    let (w, h) = src.dimensions();
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) * (1.0 - tx) + f32::from(p10[c]) * tx;
        let bottom = f32::from(p01[c]) * (1.0 - tx) + f32::from(p11[c]) * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90, 255])
        })
    }

    fn op(params: serde_json::Value) -> Box<dyn Perturbation> {
        (kind().build)(&params).unwrap()
    }

    #[test]
    fn dimensions_are_preserved() {
        for scope in ["region", "global"] {
            let img = gradient(37, 23);
            let op = op(serde_json::json!({ "intensity": 9.5, "frequency": 3.0, "scope": scope }));
            let mut rng = StdRng::seed_from_u64(0);
            let out = op.apply(img, Region::new(5, 5, 10, 10), &mut rng).unwrap();
            assert_eq!(out.dimensions(), (37, 23));
        }
    }

    #[test]
    fn zero_intensity_is_identity() {
        let img = gradient(20, 20);
        let op = op(serde_json::json!({ "intensity": 0.0, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(0);
        let out = op.apply(img.clone(), Region::full(&img), &mut rng).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn region_scope_leaves_outside_pixels_alone() {
        let img = gradient(40, 30);
        let region = Region::new(8, 6, 16, 12);
        let op = op(serde_json::json!({ "intensity": 6.0, "frequency": 4.0 }));
        let mut rng = StdRng::seed_from_u64(0);
        let out = op.apply(img.clone(), region, &mut rng).unwrap();

        for (x, y, px) in out.enumerate_pixels() {
            if !region.contains(x, y) {
                assert_eq!(px, img.get_pixel(x, y), "pixel outside region changed");
            }
        }
        assert_ne!(out, img, "warp inside the region must move something");
    }

    #[test]
    fn degenerate_frequency_is_a_noop() {
        let img = gradient(10, 10);
        let op = op(serde_json::json!({ "frequency": 0.0, "scope": "global" }));
        let mut rng = StdRng::seed_from_u64(0);
        let out = op.apply(img.clone(), Region::full(&img), &mut rng).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn bilinear_at_integer_coordinates_is_exact() {
        let img = gradient(9, 9);
        assert_eq!(sample_bilinear(&img, 4.0, 6.0), *img.get_pixel(4, 6));
    }
}
