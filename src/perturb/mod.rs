//! Perturbation operators and their registry.
//!
//! Every effect family implements [`Perturbation`] and is described by a
//! [`PerturbationKind`] entry in the [`PerturbationRegistry`]. Operators are
//! built fresh from raw config params for each image they touch and draw all
//! randomness from the pipeline's shared RNG.

mod noise;
mod registry;
mod shapes;
mod texture;
mod warp;

pub use noise::{NoiseParams, NoisePerturbation};
pub use registry::{PerturbationKind, PerturbationRegistry};
pub use shapes::{ShapesParams, ShapesPerturbation};
pub use texture::{TextureParams, TexturePerturbation};
pub use warp::{WarpParams, WarpPerturbation};

use image::RgbaImage;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;

use crate::{
    error::{PlateforgeError, PlateforgeResult},
    metadata::PerturbationRecord,
    region::Region,
};

/// A pluggable unit of image transformation.
///
/// `apply` takes the image by value and returns the transformed buffer;
/// callers never observe the pre-application state afterwards. `region` is the
/// rectangle the composited overlay occupies, and `rng` is the run's shared
/// random state.
pub trait Perturbation {
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        img: RgbaImage,
        region: Region,
        rng: &mut StdRng,
    ) -> PlateforgeResult<RgbaImage>;

    /// Effective parameters for the metadata audit trail.
    fn record(&self) -> PerturbationRecord;
}

/// Deserialize an operator's params mapping, applying the operator's own
/// defaults for anything absent. A missing or `null` mapping means
/// all-defaults; wrong-typed values are configuration errors.
pub(crate) fn parse_params<T>(name: &str, params: &serde_json::Value) -> PlateforgeResult<T>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone()).map_err(|e| {
        PlateforgeError::validation(format!("invalid params for perturbation '{name}': {e}"))
    })
}

pub(crate) fn record_for<T: serde::Serialize>(name: &str, params: &T) -> PerturbationRecord {
    PerturbationRecord {
        kind: name.to_string(),
        params: serde_json::to_value(params).unwrap_or(serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    #[serde(default)]
    struct Demo {
        intensity: i32,
    }

    #[test]
    fn null_params_mean_defaults() {
        let p: Demo = parse_params("demo", &serde_json::Value::Null).unwrap();
        assert_eq!(p, Demo::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let p: Demo =
            parse_params("demo", &serde_json::json!({ "intensity": 3, "extra": true })).unwrap();
        assert_eq!(p.intensity, 3);
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err =
            parse_params::<Demo>("demo", &serde_json::json!({ "intensity": "loud" })).unwrap_err();
        assert!(err.to_string().contains("demo"));
    }
}
