/// 2D point type for positions in source-pixel units.
pub type Point2 = nalgebra::Point2<f32>;

/// Integer grid coordinate `(x = column, y = row)`.
pub type Cell = nalgebra::Point2<i32>;

/// Integer displacement between grid coordinates.
pub type Offset = nalgebra::Vector2<i32>;

/// The four lattice neighbours as `(dx, dy)`, in `+x, +y, -x, -y` order.
pub const NEIGHBOURS_4: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Forward lattice directions: both axes and both diagonals.
///
/// Each direction's negation is the matching backward direction, so the
/// set covers all eight neighbours exactly once as unordered axes.
pub const FORWARD_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Returns `cell` displaced by `(dx, dy) * steps`, or `None` if a
/// coordinate leaves the `i32` range.
#[must_use]
pub fn step(cell: Cell, (dx, dy): (i32, i32), steps: i32) -> Option<Cell> {
    let x = dx.checked_mul(steps)?.checked_add(cell.x)?;
    let y = dy.checked_mul(steps)?.checked_add(cell.y)?;
    Some(Cell::new(x, y))
}

/// Returns `cell + offset`, or `None` if a coordinate leaves the `i32` range.
#[must_use]
pub fn translate(cell: Cell, offset: Offset) -> Option<Cell> {
    Some(Cell::new(
        cell.x.checked_add(offset.x)?,
        cell.y.checked_add(offset.y)?,
    ))
}
