//! Waypoint reduction.
//!
//! Downsamples a dense waypoint sequence by a fixed stride while always
//! keeping the exact terminal element, which the convergence monitor uses
//! as its target pose.

/// Keep every `stride`-th element plus the exact last element.
///
/// Indices `0, stride, 2*stride, ...` below the last index are kept, then
/// the true last element is appended unless it was already the last kept
/// one. Sequences shorter than the stride (and a stride of 0 or 1) return
/// the input unchanged.
pub fn reduce_by_stride<T: Clone>(seq: &[T], stride: usize) -> Vec<T> {
    if stride <= 1 || seq.len() < stride {
        return seq.to_vec();
    }

    // The strided pass stops short of the last index, so the terminal
    // element is appended explicitly.
    let last = seq.len() - 1;
    let mut reduced: Vec<T> = seq[..last].iter().step_by(stride).cloned().collect();
    reduced.push(seq[last].clone());
    reduced
}
