/// Find the slice index whose Z position is nearest `target_z`.
///
/// Returns the index only if the minimum |z - target_z| is strictly below
/// `tolerance`; otherwise `None` (nothing to draw at this slice). On exact
/// ties the first index wins (stable scan order).
pub fn nearest_slice(target_z: f64, z_positions: &[f64], tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, z) in z_positions.iter().enumerate() {
        let diff = (z - target_z).abs();
        match best {
            Some((_, d)) if diff >= d => {}
            _ => best = Some((i, diff)),
        }
    }
    match best {
        Some((i, d)) if d < tolerance => Some(i),
        _ => None,
    }
}
