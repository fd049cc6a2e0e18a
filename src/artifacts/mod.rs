//! Fitted artifacts: scaler, classifier parameters, checksums

mod manifest;
mod scaler;
pub mod schema;
mod store;

pub use manifest::{sha256_hex, Manifest, MANIFEST_FILE};
pub use scaler::{StandardScaler, SCALER_FILE};
pub use schema::{ArtifactHeader, SCHEMA_VERSION};
pub use store::{ArtifactFile, ArtifactStore, LoadedArtifacts};
