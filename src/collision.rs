//! Collision hull extraction.
//!
//! Every mesh in the "Collision" collection must be parent constrained to
//! the armature; which bone it rides is resolved by name against the bone
//! snapshot. A name that resolves to no bone is not fatal: the hull is
//! emitted with the unbound sentinel and the engine treats it as
//! world-fixed.

use hashbrown::HashMap;

use crate::basis::Basis;
use crate::error::PreconditionError;
use crate::formats::{Hull, UNBOUND_JOINT};
use crate::scene::{ObjectKind, SceneSource};

/// Collection collision meshes are authored into
pub const COLLISION_COLLECTION: &str = "Collision";

/// Extract every collision hull, engine space.
pub fn extract_hulls<S: SceneSource + ?Sized>(
    scene: &S,
    bone_index: &HashMap<&str, u32>,
    basis: &Basis,
) -> Result<Vec<Hull>, PreconditionError> {
    let objects = scene
        .objects_in(COLLISION_COLLECTION)
        .ok_or_else(|| PreconditionError::MissingCollection(COLLISION_COLLECTION.to_string()))?;

    let mut hulls = Vec::new();
    for obj in objects.iter().filter(|o| o.kind == ObjectKind::Mesh) {
        let parent_is_armature = obj
            .parent
            .as_deref()
            .and_then(|name| scene.object(name))
            .is_some_and(|parent| parent.kind == ObjectKind::Armature);
        if !parent_is_armature {
            return Err(PreconditionError::UnparentedCollision(obj.name.clone()));
        }

        let joint = match obj.parent_bone.as_deref().and_then(|b| bone_index.get(b)) {
            Some(&index) => index,
            None => {
                tracing::warn!(
                    "Collision mesh '{}' is bound to no known bone, exporting it unbound",
                    obj.name
                );
                UNBOUND_JOINT
            }
        };

        let mesh = obj
            .mesh
            .as_ref()
            .ok_or_else(|| PreconditionError::MissingMeshData(obj.name.clone()))?;
        let vertices = mesh
            .vertices
            .iter()
            .map(|&v| basis.transform_point(obj.world_matrix, v))
            .collect();

        hulls.push(Hull { joint, vertices });
    }
    Ok(hulls)
}
