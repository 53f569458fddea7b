use image::{Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut, draw_polygon_mut},
    point::Point,
    rect::Rect,
};
use rand::{Rng, rngs::StdRng};

use crate::{
    error::PlateforgeResult,
    metadata::PerturbationRecord,
    perturb::{Perturbation, PerturbationKind, parse_params, record_for},
    region::{Region, Scope},
};

const NAME: &str = "shapes";
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub fn kind() -> PerturbationKind {
    PerturbationKind {
        name: NAME,
        summary: "random opaque rectangles, ellipses and triangles occluding the overlay",
        build: |params| {
            Ok(Box::new(ShapesPerturbation {
                params: parse_params(NAME, params)?,
            }))
        },
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShapesParams {
    pub num_shapes: i64,
    pub min_size: i64,
    pub max_size: i64,
    /// Accepted for configuration symmetry with the other operators, but
    /// shapes always target the overlay box: they model plate occlusion.
    pub scope: Scope,
}

impl Default for ShapesParams {
    fn default() -> Self {
        Self {
            num_shapes: 15,
            min_size: 2,
            max_size: 10,
            scope: Scope::Region,
        }
    }
}

/// Occlusion primitives anchored inside the overlay region, solid black.
#[derive(Clone, Debug)]
pub struct ShapesPerturbation {
    params: ShapesParams,
}

impl ShapesPerturbation {
    pub fn new(params: ShapesParams) -> Self {
        Self { params }
    }
}

impl Perturbation for ShapesPerturbation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(
        &self,
        mut img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage> {
        // Degenerate sizes clamp rather than error. The cap is far beyond any
        // image dimension and keeps the i32 drawing math overflow-free.
        const SIZE_CAP: i64 = 1 << 16;
        let lo = self.params.min_size.clamp(1, SIZE_CAP);
        let hi = self.params.max_size.clamp(lo, SIZE_CAP);

        for _ in 0..self.params.num_shapes.max(0) {
            let sx = rng.random_range(region.x..=region.right()) as i32;
            let sy = rng.random_range(region.y..=region.bottom()) as i32;
            let size = rng.random_range(lo..=hi) as i32;

            match rng.random_range(0..3u8) {
                0 => draw_filled_rect_mut(
                    &mut img,
                    Rect::at(sx, sy).of_size(size as u32, size as u32),
                    BLACK,
                ),
                1 => {
                    let r = size / 2;
                    draw_filled_ellipse_mut(&mut img, (sx + r, sy + r), r.max(1), r.max(1), BLACK);
                }
                _ => {
                    let j1 = rng.random_range(-size..=size);
                    let j2 = rng.random_range(-size..=size);
                    let poly = [
                        Point::new(sx, sy),
                        Point::new(sx + j1, sy + size),
                        Point::new(sx + size, sy + j2),
                    ];
                    draw_polygon_mut(&mut img, &poly, BLACK);
                }
            }
        }
        Ok(img)
    }

    fn record(&self) -> PerturbationRecord {
        record_for(NAME, &self.params)
    }
}
