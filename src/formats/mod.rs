//! Binary layout of the face.bin asset.
//!
//! The file is a flat little-endian concatenation of sections with no
//! header, magic number, or version tag; compatibility is positional. Each
//! integer count immediately precedes its payload:
//!
//! 1. `u32` head-joint index
//! 2. `u32` vertex count, then `f32[3]` positions
//! 3. `u32` triangle count, then `u32[3]` index triples
//! 4. `u32` bone count, then column-major 4x4 `f32` inverse bind matrices
//! 5. `u32` weights per vertex K, then per vertex K x (`u32` bone, `f32` weight)
//! 6. `u32` frame count, then per frame per bone `f32[3]` translation and
//!    `f32[3]` quaternion imaginary part (the reader reconstructs w)
//! 7. `u32` hull count, then per hull `u32` joint index, `u32` vertex count,
//!    `f32[3]` positions
//!
//! The frame count is written even when it is zero.

use anyhow::Result;
use glam::{Mat4, Vec3};
use std::io::Write;

use crate::animation::BonePose;

/// Joint index of a collision hull with no bone binding. The engine treats
/// such hulls as world-fixed.
pub const UNBOUND_JOINT: u32 = 0xFFFF_FFFF;

/// Fully assembled face asset, ready to serialize
#[derive(Debug, Clone)]
pub struct FaceBin {
    pub head_joint: u32,
    /// Engine-space vertex positions of the visual mesh
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    /// One inverse bind matrix per bone, skeleton order
    pub inverse_bind: Vec<Mat4>,
    pub weights_per_vertex: u32,
    /// Exactly `weights_per_vertex` (bone, weight) slots per vertex
    pub weights: Vec<Vec<(u32, f32)>>,
    /// One row per animation frame, each row one pose per bone
    pub frames: Vec<Vec<BonePose>>,
    pub hulls: Vec<Hull>,
}

/// One collision hull section
#[derive(Debug, Clone)]
pub struct Hull {
    /// Bone index the hull rides, or [`UNBOUND_JOINT`]
    pub joint: u32,
    pub vertices: Vec<Vec3>,
}

impl FaceBin {
    /// Serialized size in bytes
    pub fn byte_size(&self) -> usize {
        let bones = self.inverse_bind.len();
        4 + (4 + 12 * self.positions.len())
            + (4 + 12 * self.triangles.len())
            + (4 + 64 * bones)
            + (4 + 8 * self.weights_per_vertex as usize * self.weights.len())
            + (4 + 24 * bones * self.frames.len())
            + self
                .hulls
                .iter()
                .fold(4, |acc, h| acc + 8 + 12 * h.vertices.len())
    }
}

/// Serialize a face asset in the fixed section order.
pub fn write_face_bin<W: Write>(w: &mut W, face: &FaceBin) -> Result<()> {
    write_u32(w, face.head_joint)?;

    write_u32(w, face.positions.len() as u32)?;
    for v in &face.positions {
        write_vec3(w, *v)?;
    }

    write_u32(w, face.triangles.len() as u32)?;
    for t in &face.triangles {
        for i in t {
            write_u32(w, *i)?;
        }
    }

    write_u32(w, face.inverse_bind.len() as u32)?;
    for m in &face.inverse_bind {
        // 16 floats, column index outer, row index inner
        for f in m.to_cols_array() {
            write_f32(w, f)?;
        }
    }

    write_u32(w, face.weights_per_vertex)?;
    for slots in &face.weights {
        if slots.len() != face.weights_per_vertex as usize {
            anyhow::bail!(
                "Vertex has {} weight slots, expected {}",
                slots.len(),
                face.weights_per_vertex
            );
        }
        for &(bone, weight) in slots {
            write_u32(w, bone)?;
            write_f32(w, weight)?;
        }
    }

    write_u32(w, face.frames.len() as u32)?;
    for frame in &face.frames {
        if frame.len() != face.inverse_bind.len() {
            anyhow::bail!(
                "Frame has {} poses, skeleton has {} bones",
                frame.len(),
                face.inverse_bind.len()
            );
        }
        for pose in frame {
            write_vec3(w, pose.translation)?;
            write_f32(w, pose.rotation.x)?;
            write_f32(w, pose.rotation.y)?;
            write_f32(w, pose.rotation.z)?;
        }
    }

    write_u32(w, face.hulls.len() as u32)?;
    for hull in &face.hulls {
        write_u32(w, hull.joint)?;
        write_u32(w, hull.vertices.len() as u32)?;
        for v in &hull.vertices {
            write_vec3(w, *v)?;
        }
    }

    Ok(())
}

fn write_u32<W: Write>(w: &mut W, value: u32) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(w: &mut W, value: f32) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_vec3<W: Write>(w: &mut W, v: Vec3) -> Result<()> {
    write_f32(w, v.x)?;
    write_f32(w, v.y)?;
    write_f32(w, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn sample_face() -> FaceBin {
        FaceBin {
            head_joint: 1,
            positions: vec![Vec3::new(1.0, 2.0, 3.0)],
            triangles: vec![[0, 0, 0]],
            inverse_bind: vec![Mat4::IDENTITY],
            weights_per_vertex: 3,
            weights: vec![vec![(0, 1.0), (0, 0.0), (0, 0.0)]],
            frames: vec![],
            hulls: vec![Hull {
                joint: UNBOUND_JOINT,
                vertices: vec![],
            }],
        }
    }

    fn serialize(face: &FaceBin) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_face_bin(&mut bytes, face).unwrap();
        bytes
    }

    #[test]
    fn layout_matches_the_engine_contract() {
        let mut expected: Vec<u8> = Vec::new();
        expected.extend(1u32.to_le_bytes()); // head joint
        expected.extend(1u32.to_le_bytes()); // vertex count
        for f in [1.0f32, 2.0, 3.0] {
            expected.extend(f.to_le_bytes());
        }
        expected.extend(1u32.to_le_bytes()); // triangle count
        expected.extend([0u8; 12]); // triangle 0 0 0
        expected.extend(1u32.to_le_bytes()); // bone count
        for f in Mat4::IDENTITY.to_cols_array() {
            expected.extend(f.to_le_bytes());
        }
        expected.extend(3u32.to_le_bytes()); // K
        expected.extend(0u32.to_le_bytes());
        expected.extend(1.0f32.to_le_bytes());
        expected.extend([0u8; 16]); // two padding slots
        expected.extend(0u32.to_le_bytes()); // frame count
        expected.extend(1u32.to_le_bytes()); // hull count
        expected.extend(0xFFFF_FFFFu32.to_le_bytes());
        expected.extend(0u32.to_le_bytes()); // hull vertex count

        let bytes = serialize(&sample_face());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn byte_size_matches_serialization() {
        let face = sample_face();
        assert_eq!(serialize(&face).len(), face.byte_size());

        let animated = FaceBin {
            frames: vec![vec![BonePose {
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            }]],
            ..face
        };
        assert_eq!(serialize(&animated).len(), animated.byte_size());
    }

    #[test]
    fn empty_animation_still_writes_its_count() {
        let bytes = serialize(&sample_face());
        // only hull count + joint + hull vertex count follow the frame count
        let offset = bytes.len() - 16;
        assert_eq!(&bytes[offset..offset + 4], &0u32.to_le_bytes());
    }

    #[test]
    fn inverse_bind_matrices_are_column_major() {
        let m = Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0));
        let face = FaceBin {
            inverse_bind: vec![m],
            weights: vec![],
            positions: vec![],
            triangles: vec![],
            hulls: vec![],
            ..sample_face()
        };
        let bytes = serialize(&face);
        // Sections before bones: head(4) + vcount(4) + tcount(4) + bone count(4)
        let matrix = &bytes[16..16 + 64];
        // Translation lives in the fourth column: floats 12, 13, 14
        let x = f32::from_le_bytes(matrix[48..52].try_into().unwrap());
        let y = f32::from_le_bytes(matrix[52..56].try_into().unwrap());
        assert_eq!((x, y), (5.0, 6.0));
    }

    #[test]
    fn short_weight_tuple_is_rejected() {
        let mut face = sample_face();
        face.weights = vec![vec![(0, 1.0)]];
        let mut sink = Vec::new();
        assert!(write_face_bin(&mut sink, &face).is_err());
    }

    #[test]
    fn frame_with_wrong_bone_count_is_rejected() {
        let mut face = sample_face();
        face.frames = vec![vec![]];
        let mut sink = Vec::new();
        assert!(write_face_bin(&mut sink, &face).is_err());
    }
}
