/// Playback direction as exported by Aseprite.
///
/// Kept for reference only: every animation plays as a forward loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Pingpong,
}

impl Direction {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "reverse" => Self::Reverse,
            "pingpong" | "pingpong_reverse" => Self::Pingpong,
            _ => Self::Forward,
        }
    }
}

/// Inclusive range of frame indices with its cached loop length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub from: usize,
    pub to: usize,
    /// Sum of frame durations over `from..=to`, in milliseconds.
    pub total_duration_ms: u64,
    pub direction: Direction,
}

impl Animation {
    pub fn frame_count(&self) -> usize {
        self.to - self.from + 1
    }
}
