use std::collections::HashSet;

use crate::camera::Player;
use crate::clock::FrameClock;
use crate::config::Config;
use crate::error::PlatformInitError;
use crate::movement::{Key, apply_movement};
use crate::renderer::{FrameStats, Palette, render_frame};
use crate::world::TileGrid;

/// Platform-independent input, translated from window events by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything one frame needs, passed explicitly to each callback.
pub struct FrameState {
    pub player: Player,
    pub grid: TileGrid,
    pub palette: Palette,
    pub clock: FrameClock,

    // Internal ARGB frame
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,

    keys_down: HashSet<Key>,
    quit: bool,
    last_stats: FrameStats,
}

impl FrameState {
    pub fn on_init(config: Config) -> Result<Self, PlatformInitError> {
        config.validate()?;
        if !config.grid.has_solid_border() {
            log::warn!("map border is not solid; rays leaving the grid will draw background");
        }
        let player = config.player();
        log::info!(
            "frame {}x{}, map {}x{}, player at ({}, {})",
            config.frame_width,
            config.frame_height,
            config.grid.width(),
            config.grid.height(),
            player.pos[0],
            player.pos[1],
        );

        Ok(Self {
            player,
            pixels: vec![0; config.frame_width * config.frame_height],
            width: config.frame_width,
            height: config.frame_height,
            grid: config.grid,
            palette: config.palette,
            clock: FrameClock::default(),
            keys_down: HashSet::new(),
            quit: false,
            last_stats: FrameStats::default(),
        })
    }

    pub fn on_event(&mut self, event: InputEvent) -> Flow {
        match event {
            InputEvent::Quit => {
                self.quit = true;
                return Flow::Quit;
            }
            InputEvent::KeyDown(key) => {
                self.keys_down.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.keys_down.remove(&key);
            }
        }
        Flow::Continue
    }

    /// Runs one frame: timing, movement for held keys, then raycast and rasterize
    /// into `pixels`.
    pub fn on_iterate(&mut self, now_ms: u64) -> Flow {
        if self.quit {
            return Flow::Quit;
        }

        let dt = self.clock.tick(now_ms);
        // Fixed order keeps the result independent of HashSet iteration order
        for key in Key::ALL {
            if self.keys_down.contains(&key) {
                apply_movement(&mut self.player, key, dt, &self.grid);
            }
        }

        let stats = render_frame(
            &mut self.pixels,
            self.width,
            self.height,
            &self.player,
            &self.grid,
            &self.palette,
        );
        if stats != FrameStats::default() && stats != self.last_stats {
            log::debug!(
                "{} degenerate rays, {} unknown tiles this frame",
                stats.degenerate_rays,
                stats.unknown_tiles
            );
        }
        self.last_stats = stats;

        Flow::Continue
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn on_quit(self) {
        log::info!(
            "quitting at ({:.2}, {:.2}) after {} ms",
            self.player.pos[0],
            self.player.pos[1],
            self.clock.now_ms()
        );
    }
}
