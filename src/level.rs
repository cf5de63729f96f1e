use crate::constants::MAX_SPEED;

/// Ghost speed stops growing at this fraction of [`MAX_SPEED`].
pub const MAX_GHOST_SPEED_RATIO: f32 = 1.1;

/// Per-level pacing. Speeds are fractions of [`MAX_SPEED`].
///
/// | level | ghost | frightened | frightened secs |
/// |-------|-------|------------|-----------------|
/// | 1     | 76%   | 50.5%      | 5.9             |
/// | 35+   | 110%  | 67.5%      | 2.5             |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Level {
    number: u32,
    ghost_speed_ratio: f32,
    frightened_speed_ratio: f32,
    frightened_secs: f32,
}

impl Level {
    pub fn new(number: u32) -> Self {
        assert!(number >= 1, "level numbers start at 1");
        let n = number as f32;
        Self {
            number,
            ghost_speed_ratio: ((75.0 + n) / 100.0).min(MAX_GHOST_SPEED_RATIO),
            frightened_speed_ratio: (50.0 + n / 2.0).min(70.0) / 100.0,
            frightened_secs: (6.0 - n / 10.0).max(0.5),
        }
    }

    pub fn next(&self) -> Self {
        Self::new(self.number.saturating_add(1))
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn ghost_speed(&self) -> f32 {
        MAX_SPEED * self.ghost_speed_ratio
    }

    pub fn frightened_speed(&self) -> f32 {
        MAX_SPEED * self.frightened_speed_ratio
    }

    pub fn frightened_secs(&self) -> f32 {
        self.frightened_secs
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3
    }

    #[test]
    fn first_level_matches_table() {
        let level = Level::new(1);
        assert!(approx_eq(level.ghost_speed(), 91.2));
        assert!(approx_eq(level.frightened_speed(), 60.6));
        assert!(approx_eq(level.frightened_secs(), 5.9));
    }

    #[test]
    fn speeds_and_duration_are_capped() {
        let level = Level::new(200);
        assert!(approx_eq(level.ghost_speed(), 132.0));
        assert!(approx_eq(level.frightened_speed(), 84.0));
        assert!(approx_eq(level.frightened_secs(), 0.5));
    }

    #[test]
    fn next_increments_number() {
        assert_eq!(Level::new(3).next().number(), 4);
    }

    #[test]
    #[should_panic(expected = "level numbers start at 1")]
    fn level_zero_is_a_logic_error() {
        let _ = Level::new(0);
    }
}
