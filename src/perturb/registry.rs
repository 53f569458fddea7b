use std::collections::HashMap;

use crate::{
    error::{PlateforgeError, PlateforgeResult},
    perturb::{Perturbation, noise, shapes, texture, warp},
};

/// Catalog entry: a user-facing operator name plus a constructor turning raw
/// config params into a ready operator instance.
#[derive(Clone, Copy)]
pub struct PerturbationKind {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: fn(&serde_json::Value) -> PlateforgeResult<Box<dyn Perturbation>>,
}

impl std::fmt::Debug for PerturbationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerturbationKind")
            .field("name", &self.name)
            .finish()
    }
}

/// Name → operator-kind catalog, owned by whoever drives a pipeline.
///
/// Registration order is preserved for introspection (`kinds`). Registering a
/// second kind under an existing name is a hard error so that a user-facing
/// configuration key can never be silently shadowed.
#[derive(Debug, Default)]
pub struct PerturbationRegistry {
    kinds: Vec<PerturbationKind>,
    by_name: HashMap<&'static str, usize>,
}

impl PerturbationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in operator families.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for kind in [
            shapes::kind(),
            noise::kind(),
            texture::kind(),
            warp::kind(),
        ] {
            reg.register(kind)
                .expect("builtin perturbation names are unique");
        }
        reg
    }

    pub fn register(&mut self, kind: PerturbationKind) -> PlateforgeResult<()> {
        let name = kind.name.trim();
        if name.is_empty() {
            return Err(PlateforgeError::validation(
                "perturbation kind must have a non-empty name",
            ));
        }
        if self.by_name.contains_key(kind.name) {
            return Err(PlateforgeError::duplicate_operator(kind.name));
        }
        self.by_name.insert(kind.name, self.kinds.len());
        self.kinds.push(kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> PlateforgeResult<&PerturbationKind> {
        self.by_name
            .get(name)
            .map(|&i| &self.kinds[i])
            .ok_or_else(|| PlateforgeError::unknown_operator(name))
    }

    /// Registered kinds, in registration order.
    pub fn kinds(&self) -> &[PerturbationKind] {
        &self.kinds
    }

    /// Instantiate an operator by name from raw config params.
    pub fn build(
        &self,
        name: &str,
        params: &serde_json::Value,
    ) -> PlateforgeResult<Box<dyn Perturbation>> {
        let kind = self.get(name)?;
        (kind.build)(params)
    }
}
