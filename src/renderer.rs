use std::ops::Range;

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::camera::Player;
use crate::error::UnknownTileCode;
use crate::raycaster::{HitRecord, Side, cast_column};
use crate::world::TileGrid;

/// Y-side faces get every channel divided by this.
pub const SHADE_DIVISOR: u8 = 2;

/// Projected wall height is capped at this many screen heights.
const MAX_LINE_SCALE: f32 = 64.0;

/// Rows per parallel fill task.
const BAND_ROWS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn shaded(self) -> Self {
        Self {
            r: self.r / SHADE_DIVISOR,
            g: self.g / SHADE_DIVISOR,
            b: self.b / SHADE_DIVISOR,
        }
    }

    /// Packed ARGB8888, fully opaque.
    #[inline]
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub ceiling: Rgb,
    pub floor: Rgb,
    /// Wall color for tile code `i + 1`.
    pub walls: Vec<Rgb>,
    /// Wall color used when a tile code has no entry.
    pub error: Rgb,
    /// Fills the whole column when a ray finds no wall.
    pub background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ceiling: Rgb::new(30, 30, 70),
            floor: Rgb::new(40, 40, 40),
            walls: vec![
                Rgb::new(200, 40, 40),   // 1: red
                Rgb::new(40, 200, 40),   // 2: green
                Rgb::new(40, 40, 200),   // 3: blue
                Rgb::new(220, 220, 220), // 4: white
                Rgb::new(220, 200, 40),  // 5: yellow
            ],
            error: Rgb::new(255, 0, 255),
            background: Rgb::new(0, 0, 0),
        }
    }
}

impl Palette {
    pub fn wall_color(&self, tile: u8) -> Result<Rgb, UnknownTileCode> {
        (tile as usize)
            .checked_sub(1)
            .and_then(|i| self.walls.get(i))
            .copied()
            .ok_or(UnknownTileCode(tile))
    }
}

/// One column of output: ceiling above `wall_start`, wall over
/// `wall_start..=wall_end`, floor below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSpec {
    pub wall_start: usize,
    pub wall_end: usize,
    pub height: usize,
    pub ceiling: u32,
    pub wall: u32,
    pub floor: u32,
}

impl StripSpec {
    /// A strip of a single color, for columns without a wall hit.
    pub fn solid(height: usize, color: Rgb) -> Self {
        let c = color.to_argb();
        Self {
            wall_start: 0,
            wall_end: height.saturating_sub(1),
            height,
            ceiling: c,
            wall: c,
            floor: c,
        }
    }

    #[inline]
    pub fn ceiling_rows(&self) -> Range<usize> {
        0..self.wall_start
    }

    #[inline]
    pub fn wall_rows(&self) -> Range<usize> {
        self.wall_start..self.wall_end + 1
    }

    #[inline]
    pub fn floor_rows(&self) -> Range<usize> {
        self.wall_end + 1..self.height
    }
}

/// Projected wall height in rows, finite even when `perp_dist` is zero.
pub fn line_height(perp_dist: f32, screen_height: usize) -> i32 {
    let h = screen_height as f32;
    let max = h * MAX_LINE_SCALE;
    let lh = h / perp_dist;
    if lh.is_finite() && lh >= 0.0 {
        lh.min(max) as i32
    } else {
        max as i32
    }
}

/// Turns one hit into the vertical strip for its column. `screen_height` must be non-zero.
pub fn render_column(
    hit: &HitRecord,
    screen_height: usize,
    palette: &Palette,
) -> Result<StripSpec, UnknownTileCode> {
    let mut color = palette.wall_color(hit.tile)?;
    if hit.side == Side::Y {
        color = color.shaded();
    }
    Ok(wall_strip(hit.perp_dist, color, screen_height, palette))
}

fn wall_strip(perp_dist: f32, color: Rgb, screen_height: usize, palette: &Palette) -> StripSpec {
    let h = screen_height as i32;
    let lh = line_height(perp_dist, screen_height);
    let wall_start = (h / 2 - lh / 2).max(0);
    let wall_end = (h / 2 + lh / 2).min(h - 1);
    StripSpec {
        wall_start: wall_start as usize,
        wall_end: wall_end as usize,
        height: screen_height,
        ceiling: palette.ceiling.to_argb(),
        wall: color.to_argb(),
        floor: palette.floor.to_argb(),
    }
}

/// Writes the ceiling, wall and floor spans of `strip` at `column`.
///
/// `buf` holds whole rows starting at screen row `first_row`; spans outside it
/// are clipped, so a frame can be filled band by band.
pub fn fill_column(
    buf: &mut [u32],
    width: usize,
    first_row: usize,
    column: usize,
    strip: &StripSpec,
) {
    let end_row = first_row + buf.len() / width;
    for (rows, color) in [
        (strip.ceiling_rows(), strip.ceiling),
        (strip.wall_rows(), strip.wall),
        (strip.floor_rows(), strip.floor),
    ] {
        for y in rows.start.max(first_row)..rows.end.min(end_row) {
            buf[(y - first_row) * width + column] = color;
        }
    }
}

/// Columns that fell back to a substitute strip during one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub degenerate_rays: usize,
    pub unknown_tiles: usize,
}

enum ColumnOutcome {
    Drawn(StripSpec),
    Degenerate(StripSpec),
    UnknownTile(StripSpec),
}

fn column_strip(
    player: &Player,
    grid: &TileGrid,
    palette: &Palette,
    column: usize,
    width: usize,
    height: usize,
) -> ColumnOutcome {
    let hit = match cast_column(player, grid, column, width) {
        Ok(hit) => hit,
        Err(e) => {
            log::trace!("column {column}: {e}");
            return ColumnOutcome::Degenerate(StripSpec::solid(height, palette.background));
        }
    };
    match render_column(&hit, height, palette) {
        Ok(strip) => ColumnOutcome::Drawn(strip),
        Err(e) => {
            log::trace!("column {column}: {e} at cell {:?}, ray {:?}", hit.cell, hit.ray_dir);
            let mut color = palette.error;
            if hit.side == Side::Y {
                color = color.shaded();
            }
            ColumnOutcome::UnknownTile(wall_strip(hit.perp_dist, color, height, palette))
        }
    }
}

/// Renders a full frame into `buf` (row-major, `width * height`).
///
/// Rays are cast in parallel, then bands of rows are filled in parallel so every
/// worker owns a disjoint slice of the buffer.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    player: &Player,
    grid: &TileGrid,
    palette: &Palette,
) -> FrameStats {
    if width == 0 || height == 0 {
        return FrameStats::default();
    }
    debug_assert_eq!(buf.len(), width * height);

    let outcomes: Vec<ColumnOutcome> = (0..width)
        .into_par_iter()
        .map(|x| column_strip(player, grid, palette, x, width, height))
        .collect();

    let mut stats = FrameStats::default();
    let strips: Vec<StripSpec> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            ColumnOutcome::Drawn(s) => s,
            ColumnOutcome::Degenerate(s) => {
                stats.degenerate_rays += 1;
                s
            }
            ColumnOutcome::UnknownTile(s) => {
                stats.unknown_tiles += 1;
                s
            }
        })
        .collect();

    buf.par_chunks_mut(width * BAND_ROWS)
        .enumerate()
        .for_each(|(band, rows)| {
            for (x, strip) in strips.iter().enumerate() {
                fill_column(rows, width, band * BAND_ROWS, x, strip);
            }
        });

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(perp_dist: f32, side: Side, tile: u8) -> HitRecord {
        HitRecord {
            ray_dir: [1.0, 0.0],
            cell: [3, 3],
            side,
            perp_dist,
            tile,
        }
    }

    fn reference_player() -> Player {
        Player {
            pos: [4.0, 4.0],
            dir: [-1.0, 0.0],
            plane: [0.0, 0.66],
            move_speed: 5.0,
            rot_speed: 3.0,
        }
    }

    fn assert_covers(strip: &StripSpec, height: usize) {
        let total = strip.ceiling_rows().len() + strip.wall_rows().len() + strip.floor_rows().len();
        assert_eq!(total, height, "{strip:?}");
        assert_eq!(strip.ceiling_rows().end, strip.wall_rows().start);
        assert_eq!(strip.wall_rows().end, strip.floor_rows().start);
    }

    #[test]
    fn test_spans_cover_every_row() {
        let palette = Palette::default();
        for height in [1, 2, 7, 432, 433] {
            for dist in [0.0, 1e-9, 0.1, 0.5, 1.0, 2.0, 3.7, 50.0, 1e9, f32::INFINITY] {
                for side in [Side::X, Side::Y] {
                    let strip = render_column(&hit(dist, side, 1), height, &palette).unwrap();
                    assert_covers(&strip, height);
                }
            }
        }
    }

    #[test]
    fn test_line_height_inverse_to_distance() {
        assert_eq!(line_height(1.0, 432), 432);
        assert_eq!(line_height(2.0, 432), 216);
        assert_eq!(line_height(4.0, 432), 108);
        assert_eq!(line_height(0.0, 432), 432 * 64);
        assert_eq!(line_height(-0.0, 432), 432 * 64);
        assert_eq!(line_height(f32::NAN, 432), 432 * 64);
    }

    #[test]
    fn test_wall_span_bounds() {
        let palette = Palette::default();
        let strip = render_column(&hit(2.0, Side::X, 2), 432, &palette).unwrap();
        assert_eq!(strip.wall_start, 216 - 108);
        assert_eq!(strip.wall_end, 216 + 108);

        let close = render_column(&hit(0.01, Side::X, 2), 432, &palette).unwrap();
        assert_eq!(close.wall_start, 0);
        assert_eq!(close.wall_end, 431);
        assert!(close.ceiling_rows().is_empty());
        assert!(close.floor_rows().is_empty());
    }

    #[test]
    fn test_side_shading_darkens() {
        let palette = Palette::default();
        for tile in 1..=palette.walls.len() as u8 {
            let x = render_column(&hit(2.0, Side::X, tile), 100, &palette).unwrap();
            let y = render_column(&hit(2.0, Side::Y, tile), 100, &palette).unwrap();
            let base = palette.wall_color(tile).unwrap();
            assert_eq!(x.wall, base.to_argb());
            assert_eq!(
                y.wall,
                Rgb::new(
                    base.r / SHADE_DIVISOR,
                    base.g / SHADE_DIVISOR,
                    base.b / SHADE_DIVISOR
                )
                .to_argb()
            );
            assert!(y.wall & 0x00FF_FFFF < x.wall & 0x00FF_FFFF);
            assert_eq!((x.wall_start, x.wall_end), (y.wall_start, y.wall_end));
            assert_eq!((x.ceiling, x.floor), (y.ceiling, y.floor));
        }
    }

    #[test]
    fn test_palette_has_distinct_walls() {
        let palette = Palette::default();
        assert!(palette.walls.len() >= 4);
        for i in 0..palette.walls.len() {
            for j in i + 1..palette.walls.len() {
                assert_ne!(palette.walls[i], palette.walls[j]);
            }
        }
    }

    #[test]
    fn test_unknown_tile_is_error() {
        let palette = Palette::default();
        assert_eq!(palette.wall_color(0), Err(UnknownTileCode(0)));
        assert_eq!(palette.wall_color(99), Err(UnknownTileCode(99)));
        assert_eq!(
            render_column(&hit(1.0, Side::X, 42), 100, &palette),
            Err(UnknownTileCode(42))
        );
    }

    #[test]
    fn test_reference_map_fully_mapped() {
        let palette = Palette::default();
        for row in crate::world::REFERENCE_MAP {
            for tile in row.into_iter().filter(|&t| t != 0) {
                palette.wall_color(tile).unwrap();
            }
        }
    }

    #[test]
    fn test_fill_column_writes_only_its_column() {
        let palette = Palette::default();
        let (w, h) = (4, 10);
        let mut buf = vec![0u32; w * h];
        let strip = render_column(&hit(2.0, Side::X, 3), h, &palette).unwrap();
        fill_column(&mut buf, w, 0, 2, &strip);
        for y in 0..h {
            for x in 0..w {
                let expected = if x != 2 {
                    0
                } else if strip.ceiling_rows().contains(&y) {
                    strip.ceiling
                } else if strip.wall_rows().contains(&y) {
                    strip.wall
                } else {
                    assert!(strip.floor_rows().contains(&y));
                    strip.floor
                };
                assert_eq!(buf[y * w + x], expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fill_column_by_bands_matches_whole() {
        let palette = Palette::default();
        let (w, h) = (3, 21);
        let strip = render_column(&hit(1.5, Side::Y, 1), h, &palette).unwrap();

        let mut whole = vec![0u32; w * h];
        fill_column(&mut whole, w, 0, 1, &strip);

        let mut banded = vec![0u32; w * h];
        for (band, rows) in banded.chunks_mut(w * 4).enumerate() {
            fill_column(rows, w, band * 4, 1, &strip);
        }
        assert_eq!(whole, banded);
    }

    #[test]
    fn test_render_frame_matches_fill_column() {
        let grid = TileGrid::reference();
        let player = reference_player();
        let palette = Palette::default();
        let (w, h) = (96, 54);

        let mut parallel = vec![0u32; w * h];
        let stats = render_frame(&mut parallel, w, h, &player, &grid, &palette);
        assert_eq!(stats, FrameStats::default());

        let mut serial = vec![0u32; w * h];
        for x in 0..w {
            let hit = cast_column(&player, &grid, x, w).unwrap();
            let strip = render_column(&hit, h, &palette).unwrap();
            fill_column(&mut serial, w, 0, x, &strip);
        }
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_render_frame_center_column() {
        let grid = TileGrid::reference();
        let player = reference_player();
        let palette = Palette::default();
        let (w, h) = (768, 432);
        let mut buf = vec![0u32; w * h];
        render_frame(&mut buf, w, h, &player, &grid, &palette);

        let green = palette.wall_color(2).unwrap().to_argb();
        assert_eq!(buf[(h / 2) * w + 384], green);
        assert_eq!(buf[384], palette.ceiling.to_argb());
        assert_eq!(buf[(h - 1) * w + 384], palette.floor.to_argb());
    }

    #[test]
    fn test_degenerate_map_falls_back() {
        // No border: rays escape instead of hitting a wall
        let grid = TileGrid::from_rows(&[[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 9]]);
        let player = Player {
            pos: [1.5, 1.5],
            dir: [-1.0, 0.0],
            plane: [0.0, 0.66],
            move_speed: 1.0,
            rot_speed: 1.0,
        };
        let palette = Palette::default();
        let (w, h) = (16, 8);
        let mut buf = vec![0u32; w * h];
        let stats = render_frame(&mut buf, w, h, &player, &grid, &palette);
        assert_eq!(stats.degenerate_rays, w);
        assert!(buf.iter().all(|&px| px == palette.background.to_argb()));
    }

    #[test]
    fn test_unknown_tile_renders_error_color() {
        let grid = TileGrid::from_rows(&[[7, 7, 7], [7, 0, 7], [7, 7, 7]]);
        let player = Player {
            pos: [1.5, 1.5],
            dir: [1.0, 0.0],
            plane: [0.0, 0.66],
            move_speed: 1.0,
            rot_speed: 1.0,
        };
        let palette = Palette::default();
        let (w, h) = (8, 8);
        let mut buf = vec![0u32; w * h];
        let stats = render_frame(&mut buf, w, h, &player, &grid, &palette);
        assert_eq!(stats.unknown_tiles, w);
        let error = palette.error.to_argb();
        let shaded = palette.error.shaded().to_argb();
        let mid = buf[(h / 2) * w + w / 2];
        assert!(mid == error || mid == shaded);
    }
}
