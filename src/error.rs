/// Fatal startup failures. The display stack needs operator attention, so these
/// are never retried.
#[derive(Debug, thiserror::Error)]
pub enum PlatformInitError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation error: {0}")]
    Window(#[from] winit::error::OsError),
    // SoftBufferError carries raw handles and is not Send, so keep only its message
    #[error("surface error: {0}")]
    Surface(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A column whose ray cannot produce a wall hit.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DegenerateRay {
    #[error("ray direction ({0}, {1}) is not finite")]
    NonFinite(f32, f32),
    #[error("ray direction has zero length")]
    ZeroLength,
    #[error("ray direction ({0}, {1}) is too shallow to step the grid")]
    TooShallow(f32, f32),
    #[error("ray left the grid at cell ({0}, {1}) without hitting a wall")]
    Escaped(i32, i32),
}

/// A wall tile code with no palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no palette entry for tile code {0}")]
pub struct UnknownTileCode(pub u8);
