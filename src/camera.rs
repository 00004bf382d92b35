pub struct Player {
    pub pos: [f32; 2],   // (x, y) position in grid space
    pub dir: [f32; 2],   // view direction, not necessarily unit length
    pub plane: [f32; 2], // camera plane, perpendicular to dir; |plane|/|dir| sets the FOV
    pub move_speed: f32, // cells per second
    pub rot_speed: f32,  // radians per second
}

impl Player {
    /// Rotates `dir` and `plane` together by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        self.dir = rotate_vec(self.dir, c, s);
        self.plane = rotate_vec(self.plane, c, s);
    }

    /// Ray direction through camera-space x coordinate `cx` in [-1, 1).
    #[inline]
    pub fn ray_dir(&self, cx: f32) -> [f32; 2] {
        [
            self.dir[0] + self.plane[0] * cx,
            self.dir[1] + self.plane[1] * cx,
        ]
    }
}

#[inline]
fn rotate_vec(v: [f32; 2], c: f32, s: f32) -> [f32; 2] {
    // Both components read from the pre-rotation vector
    let [x, y] = v;
    [x * c - y * s, x * s + y * c]
}
