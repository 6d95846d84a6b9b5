//! Per-vertex skin weight selection and normalization.
//!
//! The engine skins each vertex with a fixed number of bone influences, so
//! the authored group weights are ranked, truncated, renormalized over the
//! survivors, and padded to exactly K slots. Dropped influences are not
//! redistributed.

use hashbrown::HashMap;

use crate::error::PreconditionError;
use crate::scene::GroupWeight;

/// Build the fixed-width weight tuple for one vertex.
///
/// Selection keeps the `k` heaviest groups (stable order on ties), then:
/// - no groups at all: the vertex is skinned fully to bone 0;
/// - selected weights sum to zero or less: each selected slot is forced to
///   1.0 instead of dividing by a non-positive sum;
/// - otherwise: each selected weight is divided by the selected sum.
///
/// Trailing slots are padded with (bone 0, weight 0.0). Group names resolve
/// against the bone snapshot only after selection; an unresolvable selected
/// group is an authoring error.
pub fn build_vertex_weights(
    groups: &[GroupWeight],
    group_names: &[String],
    bone_index: &HashMap<&str, u32>,
    k: usize,
) -> Result<Vec<(u32, f32)>, PreconditionError> {
    let mut selected: Vec<GroupWeight> = groups.to_vec();
    selected.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    selected.truncate(k);

    let mut slots: Vec<(u32, f32)> = Vec::with_capacity(k);
    for g in &selected {
        let name = group_names
            .get(g.group as usize)
            .ok_or(PreconditionError::UnknownVertexGroup(g.group))?;
        let bone = *bone_index
            .get(name.as_str())
            .ok_or_else(|| PreconditionError::GroupNotABone(name.clone()))?;
        slots.push((bone, g.weight));
    }

    let total: f32 = slots.iter().map(|(_, w)| w).sum();
    if slots.is_empty() {
        slots.push((0, 1.0));
    } else if total <= 0.0 {
        for (_, w) in &mut slots {
            *w = 1.0;
        }
    } else {
        for (_, w) in &mut slots {
            *w /= total;
        }
    }

    slots.resize(k, (0, 0.0));
    Ok(slots)
}
