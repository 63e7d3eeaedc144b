pub mod inference;
pub mod layers;
pub mod linear;
pub mod model;

pub use inference::CpuNetwork;
pub use layers::{LayerDescriptor, LayerKind};
pub use linear::LinearLayer;
pub use model::Network;

/// Name of the tensor holding the architecture signature in parameter files.
pub const ARCHITECTURE_KEY: &str = "architecture";
