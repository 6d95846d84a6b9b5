//! Animation clip sampler.
//!
//! Walks the action's declared frame range (inclusive on both ends), reads
//! every bone's evaluated pose at each frame, and converts it to engine
//! space as translation plus canonical quaternion. Only the quaternion's
//! imaginary part is persisted; forcing the real part non-negative makes
//! the encoding unique and lets the reader reconstruct
//! `w = sqrt(max(0, 1 - x² - y² - z²))`.

use glam::{Mat4, Quat, Vec3};

use crate::basis::Basis;
use crate::error::PreconditionError;
use crate::scene::{Bone, FrameReset, SceneSource};

/// One bone's pose in one frame, engine space
#[derive(Debug, Clone, Copy)]
pub struct BonePose {
    pub translation: Vec3,
    /// Unit quaternion with non-negative real part
    pub rotation: Quat,
}

/// Decompose an engine-space pose matrix into translation + canonical
/// quaternion.
pub fn pose_from_matrix(m: Mat4) -> BonePose {
    let (_, rotation, translation) = m.to_scale_rotation_translation();
    let rotation = rotation.normalize();
    let rotation = if rotation.w < 0.0 { -rotation } else { rotation };
    BonePose {
        translation,
        rotation,
    }
}

/// Sample the armature's action over its full frame range.
///
/// Returns one row per frame, each row holding every bone's pose in
/// skeleton order. An armature without an action yields zero frames; that
/// is a diagnostic, not an error. The scene's frame cursor is restored to
/// frame 1 on every exit path.
pub fn sample_action<S: SceneSource + ?Sized>(
    scene: &mut S,
    armature: &str,
    bones: &[Bone],
    basis: &Basis,
) -> Result<Vec<Vec<BonePose>>, PreconditionError> {
    let range = scene
        .object(armature)
        .and_then(|o| o.armature.as_ref())
        .and_then(|a| a.action.as_ref())
        .map(|action| (action.frame_start, action.frame_end));

    let Some((frame_start, frame_end)) = range else {
        tracing::warn!("No action on armature '{armature}', writing an empty animation section");
        return Ok(Vec::new());
    };

    let mut guard = FrameReset::new(scene);
    let mut frames = Vec::with_capacity((frame_end - frame_start + 1).max(0) as usize);
    for frame in frame_start..=frame_end {
        guard.scene().set_frame(frame);
        let mut poses = Vec::with_capacity(bones.len());
        for bone in bones {
            let pose = guard.scene().bone_pose(armature, &bone.name).ok_or_else(|| {
                PreconditionError::MissingPose {
                    bone: bone.name.clone(),
                    frame,
                }
            })?;
            poses.push(pose_from_matrix(basis.conjugate(pose)));
        }
        frames.push(poses);
    }
    Ok(frames)
}
