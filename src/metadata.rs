/// Serialized form of one applied perturbation. The ordered list of these is
/// the audit trail for reproducing an image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerturbationRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub params: serde_json::Value,
}

/// Metadata for one produced image. Built once when the image finishes its
/// operator chain, written once, never mutated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationRecord {
    pub background: String,
    pub overlay: String,
    pub overlay_position: [u32; 2],
    pub overlay_size: [u32; 2],
    pub perturbations: Vec<PerturbationRecord>,
    pub random_seed: Option<u64>,
    pub variant_index: u32,
}
