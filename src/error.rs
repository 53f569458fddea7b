use std::path::PathBuf;

/// Convenience result type used across plateforge.
pub type PlateforgeResult<T> = Result<T, PlateforgeError>;

/// Top-level error taxonomy used by the generation APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlateforgeError {
    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A perturbation kind was registered under an already-taken name.
    #[error("duplicate perturbation name: {0}")]
    DuplicateOperator(String),

    /// A configured operator name has no registry entry.
    #[error("unknown perturbation: {0}")]
    UnknownOperator(String),

    /// An input directory yielded no usable images.
    #[error("no {role} images found in '{}'", .dir.display())]
    NoInputImages { role: &'static str, dir: PathBuf },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlateforgeError {
    /// Build a [`PlateforgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlateforgeError::DuplicateOperator`] value.
    pub fn duplicate_operator(name: impl Into<String>) -> Self {
        Self::DuplicateOperator(name.into())
    }

    /// Build a [`PlateforgeError::UnknownOperator`] value.
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Self::UnknownOperator(name.into())
    }

    /// Build a [`PlateforgeError::NoInputImages`] value.
    pub fn no_input_images(role: &'static str, dir: impl Into<PathBuf>) -> Self {
        Self::NoInputImages {
            role,
            dir: dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PlateforgeError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            PlateforgeError::duplicate_operator("noise")
                .to_string()
                .contains("duplicate perturbation name: noise")
        );
        assert!(
            PlateforgeError::unknown_operator("blurp")
                .to_string()
                .contains("unknown perturbation: blurp")
        );
    }

    #[test]
    fn no_input_images_names_role_and_dir() {
        let err = PlateforgeError::no_input_images("background", "/tmp/bgs");
        let msg = err.to_string();
        assert!(msg.contains("background"));
        assert!(msg.contains("/tmp/bgs"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PlateforgeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
