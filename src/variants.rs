use crate::types::ShapeMask;
use std::collections::HashSet;

/// All distinct orientations of `mask` under rotation and reflection.
///
/// Walks the dihedral group of the square: four times over, record the
/// current orientation plus its horizontal and vertical flips, then rotate
/// 90 degrees. Duplicates from shape symmetry are dropped by content, so
/// the result has between 1 and 8 masks and always contains the original.
pub fn variants(mask: &ShapeMask) -> Vec<ShapeMask> {
    let mut seen: HashSet<ShapeMask> = HashSet::new();
    let mut out = Vec::new();

    let mut current = mask.clone();
    for _ in 0..4 {
        for candidate in [
            current.clone(),
            current.flipped_horizontal(),
            current.flipped_vertical(),
        ] {
            if seen.insert(candidate.clone()) {
                out.push(candidate);
            }
        }
        current = current.rotated();
    }

    out
}
