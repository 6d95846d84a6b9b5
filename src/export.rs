//! The export pipeline.
//!
//! Single deterministic pass over the scene: precondition checks, bone
//! snapshot, inverse bind matrices, skin weights, animation sampling,
//! collision hulls, then serialization. The bone list is snapshotted once
//! up front and every index in the file is derived from that one ordering;
//! the live scene is never re-queried for bone order mid-export.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::animation::sample_action;
use crate::basis::Basis;
use crate::collision::extract_hulls;
use crate::config::ExportConfig;
use crate::error::PreconditionError;
use crate::formats::{write_face_bin, FaceBin};
use crate::scene::{Bone, MeshData, Modifier, ObjectKind, SceneSource};
use crate::skin::build_vertex_weights;

/// Collection the skinned mesh and its armature are authored into
pub const VISUAL_COLLECTION: &str = "Visual";

/// Run the full export pass and assemble the face asset in memory.
pub fn export_face<S: SceneSource + ?Sized>(
    scene: &mut S,
    config: &ExportConfig,
) -> Result<FaceBin> {
    config.validate()?;
    let basis = config.basis();
    scene.set_frame(1);

    // Exactly one skinned mesh in "Visual"
    let visual = scene
        .objects_in(VISUAL_COLLECTION)
        .ok_or_else(|| PreconditionError::MissingCollection(VISUAL_COLLECTION.to_string()))?;
    let meshes: Vec<_> = visual
        .iter()
        .filter(|o| o.kind == ObjectKind::Mesh)
        .collect();
    if meshes.len() != 1 {
        return Err(PreconditionError::VisualMeshCount(meshes.len()).into());
    }
    let obj = meshes[0];
    let mesh = obj
        .mesh
        .as_ref()
        .ok_or_else(|| PreconditionError::MissingMeshData(obj.name.clone()))?;

    // The armature the mesh is skinned to
    let armature_name = obj
        .modifiers
        .iter()
        .find_map(|m| match m {
            Modifier::Armature { object } => Some(object.clone()),
        })
        .ok_or_else(|| PreconditionError::MissingArmatureModifier(obj.name.clone()))?;
    let armature = scene
        .object(&armature_name)
        .filter(|o| o.kind == ObjectKind::Armature)
        .and_then(|o| o.armature.as_ref())
        .ok_or_else(|| PreconditionError::MissingArmatureObject(armature_name.clone()))?;

    // Bone snapshot: the single authoritative ordering for every index below
    let bones: Vec<Bone> = armature.bones.clone();
    let bone_index: HashMap<&str, u32> = bones
        .iter()
        .enumerate()
        .map(|(i, b)| (b.name.as_str(), i as u32))
        .collect();

    let head_joint = *bone_index
        .get(config.head_joint.as_str())
        .ok_or_else(|| PreconditionError::MissingHeadJoint(config.head_joint.clone()))?;

    // Visual mesh geometry, engine space
    let positions: Vec<Vec3> = mesh
        .vertices
        .iter()
        .map(|&v| basis.transform_point(obj.world_matrix, v))
        .collect();
    let triangles = triangles_of(mesh)?;

    // Derived skinning data
    let inverse_bind: Vec<Mat4> = bones
        .iter()
        .map(|b| basis.conjugate(b.matrix_local).inverse())
        .collect();
    let k = config.weights_per_vertex;
    let mut weights = Vec::with_capacity(mesh.vertices.len());
    for vertex in 0..mesh.vertices.len() {
        let groups = mesh.groups.get(vertex).map(Vec::as_slice).unwrap_or(&[]);
        let slots = build_vertex_weights(groups, &obj.vertex_groups, &bone_index, k)
            .with_context(|| format!("Bad skin weights on vertex {vertex}"))?;
        weights.push(slots);
    }

    // Borrows of the visual object end here; sampling needs the scene mutable
    let frames = sample_action(scene, &armature_name, &bones, &basis)?;
    let hulls = extract_hulls(scene, &bone_index, &basis)?;

    Ok(FaceBin {
        head_joint,
        positions,
        triangles,
        inverse_bind,
        weights_per_vertex: k as u32,
        weights,
        frames,
        hulls,
    })
}

/// Export straight to a file.
pub fn export_face_to_file<S: SceneSource + ?Sized>(
    scene: &mut S,
    config: &ExportConfig,
    output: &Path,
) -> Result<()> {
    let face = export_face(scene, config)?;
    let file =
        File::create(output).with_context(|| format!("Failed to create output: {output:?}"))?;
    let mut writer = BufWriter::new(file);
    write_face_bin(&mut writer, &face)?;
    writer.flush()?;

    tracing::info!(
        "Exported face asset: {} vertices, {} triangles, {} bones, {} frames, {} hulls ({} bytes)",
        face.positions.len(),
        face.triangles.len(),
        face.inverse_bind.len(),
        face.frames.len(),
        face.hulls.len(),
        face.byte_size()
    );
    Ok(())
}

/// Run every precondition check without writing anything.
pub fn check_scene<S: SceneSource + ?Sized>(scene: &mut S, config: &ExportConfig) -> Result<()> {
    let face = export_face(scene, config)?;
    tracing::info!(
        "Scene is exportable: {} vertices, {} bones, {} frames, {} hulls",
        face.positions.len(),
        face.inverse_bind.len(),
        face.frames.len(),
        face.hulls.len()
    );
    Ok(())
}

fn triangles_of(mesh: &MeshData) -> Result<Vec<[u32; 3]>, PreconditionError> {
    let vertex_count = mesh.vertices.len();
    let mut triangles = Vec::with_capacity(mesh.polygons.len());
    for (index, polygon) in mesh.polygons.iter().enumerate() {
        let &[a, b, c] = polygon.as_slice() else {
            return Err(PreconditionError::NonTrianglePolygon {
                index,
                count: polygon.len(),
            });
        };
        for vertex in [a, b, c] {
            if vertex as usize >= vertex_count {
                return Err(PreconditionError::VertexIndexOutOfRange {
                    index,
                    vertex,
                    vertex_count,
                });
            }
        }
        triangles.push([a, b, c]);
    }
    Ok(triangles)
}
