use image::{RgbaImage, imageops};

use crate::error::{PlateforgeError, PlateforgeResult};

/// Pixel rectangle occupied by the composited overlay, in background
/// coordinates. Constructed from the actual placement, so it always lies
/// inside the background bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region for an overlay of `size` placed at `position`.
    pub fn from_placement(position: (u32, u32), size: (u32, u32)) -> Self {
        Self::new(position.0, position.1, size.0, size.1)
    }

    /// Region covering a full image.
    pub fn full(image: &RgbaImage) -> Self {
        Self::new(0, 0, image.width(), image.height())
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Whether an operator's effect targets the overlay region only or the whole
/// image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Region,
    Global,
}

impl Scope {
    /// The rectangle an operator should treat as its target.
    pub fn resolve(self, region: Region, image: &RgbaImage) -> Region {
        match self {
            Scope::Region => region,
            Scope::Global => Region::full(image),
        }
    }
}

/// Run a pixel transform against the scoped target of `img`.
///
/// With `Scope::Global` the transform sees the whole image. With
/// `Scope::Region` it sees a copy of the region sub-array, which is written
/// back in place afterwards; pixels outside the region are untouched. The
/// transform must preserve dimensions.
pub fn map_scoped<F>(
    mut img: RgbaImage,
    region: Region,
    scope: Scope,
    f: F,
) -> PlateforgeResult<RgbaImage>
where
    F: FnOnce(RgbaImage) -> PlateforgeResult<RgbaImage>,
{
    let target = scope.resolve(region, &img);
    let sub = imageops::crop_imm(&img, target.x, target.y, target.width, target.height).to_image();
    let dims = sub.dimensions();
    let out = f(sub)?;
    check_dims(out.dimensions(), dims)?;
    imageops::replace(&mut img, &out, i64::from(target.x), i64::from(target.y));
    Ok(img)
}

fn check_dims(got: (u32, u32), want: (u32, u32)) -> PlateforgeResult<()> {
    if got != want {
        return Err(PlateforgeError::validation(format!(
            "scoped transform changed dimensions from {want:?} to {got:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn from_placement_matches_fields() {
        let r = Region::from_placement((10, 20), (30, 40));
        assert_eq!(r, Region::new(10, 20, 30, 40));
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn resolve_global_covers_image() {
        let img = solid(64, 32, [0, 0, 0, 255]);
        let r = Region::new(5, 5, 10, 10);
        assert_eq!(Scope::Global.resolve(r, &img), Region::new(0, 0, 64, 32));
        assert_eq!(Scope::Region.resolve(r, &img), r);
    }

    #[test]
    fn scope_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Region).unwrap(), "\"region\"");
        let s: Scope = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(s, Scope::Global);
    }

    #[test]
    fn map_scoped_region_touches_only_region() {
        let img = solid(20, 10, [10, 10, 10, 255]);
        let region = Region::new(4, 2, 6, 5);
        let out = map_scoped(img, region, Scope::Region, |mut sub| {
            for px in sub.pixels_mut() {
                *px = Rgba([200, 0, 0, 255]);
            }
            Ok(sub)
        })
        .unwrap();

        for (x, y, px) in out.enumerate_pixels() {
            if region.contains(x, y) {
                assert_eq!(px.0, [200, 0, 0, 255]);
            } else {
                assert_eq!(px.0, [10, 10, 10, 255]);
            }
        }
    }

    #[test]
    fn map_scoped_global_sees_whole_image() {
        let img = solid(8, 8, [1, 2, 3, 255]);
        let region = Region::new(0, 0, 1, 1);
        let out = map_scoped(img, region, Scope::Global, |sub| {
            assert_eq!(sub.dimensions(), (8, 8));
            Ok(sub)
        })
        .unwrap();
        assert_eq!(out.dimensions(), (8, 8));
    }

    #[test]
    fn map_scoped_global_writes_back_everywhere() {
        let img = solid(6, 4, [9, 9, 9, 255]);
        let out = map_scoped(img, Region::new(1, 1, 2, 2), Scope::Global, |mut sub| {
            for px in sub.pixels_mut() {
                *px = Rgba([0, 50, 0, 255]);
            }
            Ok(sub)
        })
        .unwrap();
        assert!(out.pixels().all(|p| p.0 == [0, 50, 0, 255]));
    }

    #[test]
    fn map_scoped_rejects_dimension_change() {
        let img = solid(8, 8, [0, 0, 0, 255]);
        let region = Region::new(0, 0, 4, 4);
        let err = map_scoped(img, region, Scope::Region, |_| Ok(solid(2, 2, [0; 4])))
            .unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }
}
