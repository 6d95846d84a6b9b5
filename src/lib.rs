//! face-export library
//!
//! Converts an authored character scene snapshot (skinned mesh, skeleton,
//! bone animation, collision hulls) into the engine's `face.bin` binary
//! asset. The authoring tool dumps a post-evaluation snapshot of its scene
//! graph as JSON; everything downstream of that snapshot lives here.

pub mod animation;
pub mod basis;
pub mod collision;
pub mod config;
pub mod error;
pub mod export;
pub mod formats;
pub mod scene;
pub mod skin;

// Re-export the key types for callers that embed the exporter
pub use basis::Basis;
pub use config::ExportConfig;
pub use error::PreconditionError;
pub use export::{check_scene, export_face, export_face_to_file};
pub use formats::{write_face_bin, FaceBin, UNBOUND_JOINT};
pub use scene::{SceneSnapshot, SceneSource};
