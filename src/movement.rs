use winit::keyboard::KeyCode;

use crate::camera::Player;
use crate::world::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Forward, Key::Backward, Key::TurnLeft, Key::TurnRight];

    /// WASD and the arrow keys.
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Key::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Key::Backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Key::TurnLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Key::TurnRight),
            _ => None,
        }
    }
}

/// Applies one key for `dt` seconds.
///
/// Translation is checked per axis (x, then y) against the current value of
/// the other axis, so the player slides along walls instead of sticking.
pub fn apply_movement(player: &mut Player, key: Key, dt: f32, grid: &TileGrid) {
    match key {
        Key::Forward => translate(player, 1.0, dt, grid),
        Key::Backward => translate(player, -1.0, dt, grid),
        Key::TurnLeft => player.rotate(player.rot_speed * dt),
        Key::TurnRight => player.rotate(-player.rot_speed * dt),
    }
}

fn translate(player: &mut Player, sign: f32, dt: f32, grid: &TileGrid) {
    let step = sign * player.move_speed * dt;

    let new_x = player.pos[0] + player.dir[0] * step;
    if grid.cell_at(new_x, player.pos[1]).is_empty() {
        player.pos[0] = new_x;
    }

    let new_y = player.pos[1] + player.dir[1] * step;
    if grid.cell_at(player.pos[0], new_y).is_empty() {
        player.pos[1] = new_y;
    }
}
