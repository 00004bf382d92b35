use crate::camera::Player;
use crate::error::PlatformInitError;
use crate::renderer::Palette;
use crate::world::TileGrid;

pub struct Config {
    pub title: String,

    // Internal frame, stretched to the window on present
    pub frame_width: usize,
    pub frame_height: usize,

    pub start_pos: [f32; 2],
    pub start_dir: [f32; 2],
    pub start_plane: [f32; 2],
    pub move_speed: f32, // cells/s
    pub rot_speed: f32,  // rad/s

    pub grid: TileGrid,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Grid Raycaster".to_string(),
            frame_width: 768,
            frame_height: 432,
            start_pos: [4.0, 4.0],
            start_dir: [-1.0, 0.0],
            start_plane: [0.0, 0.66],
            move_speed: 5.0,
            rot_speed: 3.0,
            grid: TileGrid::reference(),
            palette: Palette::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), PlatformInitError> {
        let invalid = |msg: String| Err(PlatformInitError::Config(msg));

        if self.frame_width == 0 || self.frame_height == 0 {
            return invalid(format!(
                "frame size {}x{} must be non-zero",
                self.frame_width, self.frame_height
            ));
        }
        // softbuffer takes NonZeroU32 dimensions
        if u32::try_from(self.frame_width).is_err() || u32::try_from(self.frame_height).is_err() {
            return invalid("frame size does not fit in u32".to_string());
        }
        for (name, speed) in [("move_speed", self.move_speed), ("rot_speed", self.rot_speed)] {
            if !speed.is_finite() || speed < 0.0 {
                return invalid(format!("{name} must be finite and non-negative, got {speed}"));
            }
        }
        let vectors = [self.start_pos, self.start_dir, self.start_plane];
        if vectors.iter().flatten().any(|v| !v.is_finite()) {
            return invalid("start vectors must be finite".to_string());
        }
        if self.start_dir == [0.0, 0.0] {
            return invalid("start direction must be non-zero".to_string());
        }
        if !self.grid.cell_at(self.start_pos[0], self.start_pos[1]).is_empty() {
            return invalid(format!(
                "start position ({}, {}) is not an empty cell",
                self.start_pos[0], self.start_pos[1]
            ));
        }
        Ok(())
    }

    pub fn player(&self) -> Player {
        Player {
            pos: self.start_pos,
            dir: self.start_dir,
            plane: self.start_plane,
            move_speed: self.move_speed,
            rot_speed: self.rot_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_frame() {
        let config = Config {
            frame_height: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PlatformInitError::Config(_))));
    }

    #[test]
    fn test_rejects_start_in_wall() {
        let config = Config {
            start_pos: [1.5, 4.5],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PlatformInitError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_speed() {
        let config = Config {
            rot_speed: f32::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_direction() {
        let config = Config {
            start_dir: [0.0, 0.0],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
