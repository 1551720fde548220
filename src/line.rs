//! 3D digital line rasterization
//!
//! Extends the classic 2D integer line algorithm to three dimensions with
//! two independent error accumulators. One axis drives the walk; the
//! other two carry fractional error against the driving span and emit a
//! unit step whenever their accumulator overflows it.

use glam::IVec3;

/// Rasterize the digital line from `from` to `to`
///
/// The driving axis is x, unless |dy| exceeds |dx|, then y; z takes over
/// when its span strictly exceeds the current driving span. Both
/// endpoints are included in the returned path, so `line(a, a)` yields
/// `[a]` and the path length is always `longest_span + 1`, symmetric in
/// the two endpoints. Consecutive points differ by at most one cell on
/// each axis.
pub fn line(from: IVec3, to: IVec3) -> Vec<IVec3> {
    let delta = [to.x - from.x, to.y - from.y, to.z - from.z];
    let span = [delta[0].abs(), delta[1].abs(), delta[2].abs()];

    let mut drive = 0;
    if span[1] > span[0] {
        drive = 1;
    }
    if span[2] > span[drive] {
        drive = 2;
    }
    let longest = span[drive];
    let secondary = match drive {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    };

    let mut pos = [from.x, from.y, from.z];
    let mut accumulator = [longest / 2; 2];
    let mut path = Vec::with_capacity(longest as usize + 1);
    path.push(IVec3::from(pos));

    for _ in 0..longest {
        pos[drive] += delta[drive].signum();

        for (acc, &axis) in accumulator.iter_mut().zip(secondary.iter()) {
            *acc += span[axis];
            if *acc >= longest {
                pos[axis] += delta[axis].signum();
                *acc -= longest;
            }
        }

        path.push(IVec3::from(pos));
    }

    path
}
