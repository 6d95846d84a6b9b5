//! Authoring-contract violations that abort an export.
//!
//! The exporter runs against a curated scene, so a failed precondition means
//! the scene is malformed, not that the tool should recover. Soft anomalies
//! (missing animation, unresolvable collision bones) are not errors; those
//! degrade with a diagnostic and the export continues.

/// Fatal precondition violations detected while reading the scene
#[derive(Debug, Clone, thiserror::Error)]
pub enum PreconditionError {
    /// A required named collection is missing from the scene
    #[error("no '{0}' collection found in scene")]
    MissingCollection(String),

    /// The "Visual" collection must hold exactly one mesh object
    #[error("expected exactly one mesh in the 'Visual' collection, found {0}")]
    VisualMeshCount(usize),

    /// The visual mesh carries no armature modifier
    #[error("visual mesh '{0}' has no armature modifier")]
    MissingArmatureModifier(String),

    /// An armature modifier or parent names an object that is not an armature
    #[error("armature object '{0}' not found in scene")]
    MissingArmatureObject(String),

    /// The configured head-attachment bone is absent from the skeleton
    #[error("head joint bone '{0}' not found in skeleton")]
    MissingHeadJoint(String),

    /// A mesh-type object carries no mesh data
    #[error("object '{0}' has no mesh data")]
    MissingMeshData(String),

    /// Only triangulated meshes are exportable
    #[error("polygon {index} has {count} vertices, mesh must be triangulated")]
    NonTrianglePolygon { index: usize, count: usize },

    /// A polygon references a vertex index past the end of the vertex list
    #[error("polygon {index} references vertex {vertex}, mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        index: usize,
        vertex: u32,
        vertex_count: usize,
    },

    /// A vertex references a group index with no entry in the group table
    #[error("vertex group {0} out of range for mesh")]
    UnknownVertexGroup(u32),

    /// A selected vertex group is not named after any bone
    #[error("vertex group '{0}' does not name a bone in the skeleton")]
    GroupNotABone(String),

    /// Collision meshes must be parent constrained to the armature
    #[error("collision mesh '{0}' is not parented to an armature")]
    UnparentedCollision(String),

    /// The action declares a frame the snapshot holds no evaluated pose for
    #[error("no evaluated pose for bone '{bone}' at frame {frame}")]
    MissingPose { bone: String, frame: i32 },
}
