//! Network parameters and consensus-wide constants.

pub mod constants;
pub mod params;
pub mod registry;

/// 32-byte digest in internal (little-endian) byte order; rendered as
/// big-endian hex for display.
pub type Hash256 = [u8; 32];

pub use params::{
    chain_params, hash256_from_hex, hash256_to_hex, Checkpoint, Deployment, DeploymentId, Network,
    Params,
};
pub use registry::{ParamsRegistry, RegistryError};
