use crate::camera::Player;
use crate::error::DegenerateRay;
use crate::world::{Cell, TileGrid};

/// Stand-in delta distance for an axis the ray runs parallel to.
const PARALLEL_DELTA: f32 = 1e30;

/// Which family of grid lines the ray crossed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// A vertical grid line (constant x): east or west face.
    X,
    /// A horizontal grid line (constant y): north or south face.
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub ray_dir: [f32; 2],
    pub cell: [i32; 2],
    pub side: Side,
    pub perp_dist: f32,
    pub tile: u8,
}

/// Maps a screen column to camera space, -1 at the left edge, approaching 1 at the right.
#[inline]
pub fn camera_x(column: usize, screen_width: usize) -> f32 {
    2.0 * column as f32 / screen_width as f32 - 1.0
}

#[inline]
fn delta_dist(component: f32) -> f32 {
    if component == 0.0 {
        PARALLEL_DELTA
    } else {
        (1.0 / component).abs()
    }
}

/// Casts the ray for one screen column and walks the grid until it hits a wall.
///
/// Pure in its inputs, so columns may be cast in any order or in parallel.
pub fn cast_column(
    player: &Player,
    grid: &TileGrid,
    column: usize,
    screen_width: usize,
) -> Result<HitRecord, DegenerateRay> {
    let ray_dir = player.ray_dir(camera_x(column, screen_width));
    cast_ray(player.pos, ray_dir, grid)
}

/// DDA walk from `origin` along `ray_dir`.
pub fn cast_ray(
    origin: [f32; 2],
    ray_dir: [f32; 2],
    grid: &TileGrid,
) -> Result<HitRecord, DegenerateRay> {
    let [rx, ry] = ray_dir;
    if !(rx.is_finite() && ry.is_finite()) {
        return Err(DegenerateRay::NonFinite(rx, ry));
    }
    if rx == 0.0 && ry == 0.0 {
        return Err(DegenerateRay::ZeroLength);
    }
    if !(origin[0].is_finite() && origin[1].is_finite()) {
        return Err(DegenerateRay::NonFinite(origin[0], origin[1]));
    }

    if grid.cell_at(origin[0], origin[1]) == Cell::OutOfBounds {
        return Err(DegenerateRay::Escaped(origin[0] as i32, origin[1] as i32));
    }

    let mut map_x = origin[0] as i32;
    let mut map_y = origin[1] as i32;

    // Subnormal components overflow 1/c to infinity
    let delta_x = delta_dist(rx);
    let delta_y = delta_dist(ry);
    if !(delta_x.is_finite() && delta_y.is_finite()) {
        return Err(DegenerateRay::TooShallow(rx, ry));
    }

    let (step_x, mut side_x) = if rx < 0.0 {
        (-1, (origin[0] - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - origin[0]) * delta_x)
    };
    let (step_y, mut side_y) = if ry < 0.0 {
        (-1, (origin[1] - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - origin[1]) * delta_y)
    };

    // Each step moves one cell along a fixed direction, so a ray starting inside
    // the grid reaches a wall or leaves within width + height steps.
    loop {
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_y += delta_y;
            map_y += step_y;
            Side::Y
        };

        match grid.cell(map_x, map_y) {
            Cell::Empty => continue,
            Cell::Wall(tile) => {
                let perp_dist = match side {
                    Side::X => side_x - delta_x,
                    Side::Y => side_y - delta_y,
                };
                return Ok(HitRecord {
                    ray_dir,
                    cell: [map_x, map_y],
                    side,
                    perp_dist,
                    tile,
                });
            }
            Cell::OutOfBounds => return Err(DegenerateRay::Escaped(map_x, map_y)),
        }
    }
}
