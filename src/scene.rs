//! Scene snapshot data model and the narrow view the exporter reads through.
//!
//! The authoring tool dumps its scene as a JSON snapshot after evaluating
//! constraints and keyframes; this module is the only place that shape is
//! known. The export pipeline itself talks to the [`SceneSource`] trait, a
//! minimal read-only capability set plus the frame cursor, so the core never
//! depends on the authoring tool's API.

use anyhow::{Context, Result};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Narrow read-only view of the source scene plus the frame cursor.
///
/// The cursor is the one piece of externally visible mutable state: stepping
/// it selects which evaluated pose [`SceneSource::bone_pose`] returns.
pub trait SceneSource {
    /// Objects of the named collection, in authored order
    fn objects_in(&self, collection: &str) -> Option<&[SceneObject]>;

    /// Look up any object in the scene by name
    fn object(&self, name: &str) -> Option<&SceneObject>;

    /// The current frame cursor
    fn current_frame(&self) -> i32;

    /// Move the frame cursor
    fn set_frame(&mut self, frame: i32);

    /// Evaluated pose matrix (armature space) of `bone` on the named
    /// armature at the current frame. `None` when the snapshot holds no
    /// evaluated pose for that frame.
    fn bone_pose(&self, armature: &str, bone: &str) -> Option<Mat4>;
}

/// Restores the frame cursor to frame 1 when dropped.
///
/// Sampling steps the cursor across the clip; wrapping the loop in this
/// guard keeps the source scene unaltered on every exit path, including
/// early returns and errors.
pub struct FrameReset<'a, S: SceneSource + ?Sized> {
    scene: &'a mut S,
}

impl<'a, S: SceneSource + ?Sized> FrameReset<'a, S> {
    pub fn new(scene: &'a mut S) -> Self {
        Self { scene }
    }

    pub fn scene(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: SceneSource + ?Sized> Drop for FrameReset<'_, S> {
    fn drop(&mut self) {
        self.scene.set_frame(1);
    }
}

// ============================================================================
// Snapshot model (what the authoring tool dumps)
// ============================================================================

/// Post-evaluation snapshot of the authoring scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub collections: Vec<Collection>,
    #[serde(skip, default = "default_frame")]
    current_frame: i32,
}

fn default_frame() -> i32 {
    1
}

/// Named object group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub objects: Vec<SceneObject>,
}

/// One object in the scene graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub world_matrix: Mat4,
    #[serde(default)]
    pub mesh: Option<MeshData>,
    #[serde(default)]
    pub armature: Option<ArmatureData>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Name of the parent object, if parented
    #[serde(default)]
    pub parent: Option<String>,
    /// Bone the object is parent constrained to
    #[serde(default)]
    pub parent_bone: Option<String>,
    /// Group-index-to-name table for this object's vertex groups
    #[serde(default)]
    pub vertex_groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Armature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modifier {
    /// Skinning modifier binding a mesh to an armature object
    Armature { object: String },
}

/// Mesh geometry plus per-vertex skin group weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    /// Local-space vertex positions, authored order
    pub vertices: Vec<glam::Vec3>,
    /// Polygons as vertex index lists (the exporter requires triangles)
    pub polygons: Vec<Vec<u32>>,
    /// Raw (group, weight) pairs per vertex; may be empty for unskinned
    /// meshes such as collision hulls
    #[serde(default)]
    pub groups: Vec<Vec<GroupWeight>>,
}

/// One raw skin-group influence on a vertex
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupWeight {
    pub group: u32,
    pub weight: f32,
}

/// Skeleton data attached to an armature object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmatureData {
    /// Ordered bone list; a bone's index in the export is its position here
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub action: Option<ActionData>,
}

/// One bone of the skeleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Bind-pose transform in armature space
    pub matrix_local: Mat4,
}

/// An animation action with its evaluated pose matrices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub frame_start: i32,
    pub frame_end: i32,
    /// One row per frame of the inclusive range, each row index-aligned
    /// with the armature's bone list
    pub frames: Vec<Vec<Mat4>>,
}

impl SceneSnapshot {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self {
            collections,
            current_frame: default_frame(),
        }
    }

    /// Load a scene snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open scene snapshot: {path:?}"))?;
        let snapshot = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse scene snapshot: {path:?}"))?;
        Ok(snapshot)
    }

    /// All objects across all collections
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.collections.iter().flat_map(|c| c.objects.iter())
    }
}

impl SceneSource for SceneSnapshot {
    fn objects_in(&self, collection: &str) -> Option<&[SceneObject]> {
        self.collections
            .iter()
            .find(|c| c.name == collection)
            .map(|c| c.objects.as_slice())
    }

    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects().find(|o| o.name == name)
    }

    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn set_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }

    fn bone_pose(&self, armature: &str, bone: &str) -> Option<Mat4> {
        let data = self.object(armature)?.armature.as_ref()?;
        let index = data.bones.iter().position(|b| b.name == bone)?;
        match &data.action {
            Some(action) => {
                let offset = usize::try_from(self.current_frame - action.frame_start).ok()?;
                action.frames.get(offset)?.get(index).copied()
            }
            // No action: the pose is the rest pose at every frame
            None => Some(data.bones[index].matrix_local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn snapshot_with_action() -> SceneSnapshot {
        let pose = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        SceneSnapshot::new(vec![Collection {
            name: "Visual".into(),
            objects: vec![SceneObject {
                name: "Rig".into(),
                kind: ObjectKind::Armature,
                world_matrix: Mat4::IDENTITY,
                mesh: None,
                armature: Some(ArmatureData {
                    bones: vec![Bone {
                        name: "Root".into(),
                        matrix_local: Mat4::IDENTITY,
                    }],
                    action: Some(ActionData {
                        frame_start: 5,
                        frame_end: 6,
                        frames: vec![vec![Mat4::IDENTITY], vec![pose]],
                    }),
                }),
                modifiers: vec![],
                parent: None,
                parent_bone: None,
                vertex_groups: vec![],
            }],
        }])
    }

    #[test]
    fn bone_pose_follows_the_frame_cursor() {
        let mut scene = snapshot_with_action();
        scene.set_frame(5);
        assert_eq!(scene.bone_pose("Rig", "Root"), Some(Mat4::IDENTITY));
        scene.set_frame(6);
        let pose = scene.bone_pose("Rig", "Root").unwrap();
        assert_eq!(pose.w_axis.y, 1.0);
    }

    #[test]
    fn bone_pose_outside_the_sampled_range_is_none() {
        let mut scene = snapshot_with_action();
        scene.set_frame(4);
        assert_eq!(scene.bone_pose("Rig", "Root"), None);
        scene.set_frame(7);
        assert_eq!(scene.bone_pose("Rig", "Root"), None);
    }

    #[test]
    fn frame_reset_restores_on_drop() {
        let mut scene = snapshot_with_action();
        {
            let mut guard = FrameReset::new(&mut scene);
            guard.scene().set_frame(42);
            assert_eq!(guard.scene().current_frame(), 42);
        }
        assert_eq!(scene.current_frame(), 1);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let scene = snapshot_with_action();
        let json = serde_json::to_string(&scene).unwrap();
        let back: SceneSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.collections.len(), 1);
        assert_eq!(back.current_frame(), 1);
        assert!(back.bone_pose("Rig", "Root").is_none()); // cursor starts at 1
    }
}
