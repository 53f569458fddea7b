use image::{RgbaImage, imageops};

use crate::{
    error::{PlateforgeError, PlateforgeResult},
    region::Region,
};

/// Placement that centers an overlay of `ov` size on a background of `bg`
/// size. Errors if the overlay does not fit, since a clipped paste would
/// produce a region outside the background bounds.
pub fn center_position(bg: (u32, u32), ov: (u32, u32)) -> PlateforgeResult<(u32, u32)> {
    if ov.0 > bg.0 || ov.1 > bg.1 {
        return Err(PlateforgeError::validation(format!(
            "overlay {}x{} does not fit background {}x{}",
            ov.0, ov.1, bg.0, bg.1
        )));
    }
    Ok(((bg.0 - ov.0) / 2, (bg.1 - ov.1) / 2))
}

/// Alpha-blend `overlay` onto a fresh copy of `background`, centered.
///
/// Returns the composite together with the region the overlay occupies.
pub fn composite_centered(
    background: &RgbaImage,
    overlay: &RgbaImage,
) -> PlateforgeResult<(RgbaImage, Region)> {
    let (x, y) = center_position(background.dimensions(), overlay.dimensions())?;
    let mut out = background.clone();
    imageops::overlay(&mut out, overlay, i64::from(x), i64::from(y));
    let region = Region::from_placement((x, y), overlay.dimensions());
    Ok((out, region))
}
