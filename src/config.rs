use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AMBUSH_LOOKAHEAD, CELL_SIZE, CENTER_TOLERANCE_RATIO, EYES_SPEED_MULTIPLIER,
    FLANK_LOOKAHEAD, FRIGHTENED_BLINK_INTERVAL_SECS, FRIGHTENED_BLINK_WINDOW_SECS, HITBOX_SCALE,
    HOUSE_SWAP_SECS, MAX_SPEED, RELEASE_DELAYS_SECS, SCORE_DISPLAY_SECS, SHY_DISTANCE, TICK_RATE,
};
use crate::error::ConfigError;
use crate::level::MAX_GHOST_SPEED_RATIO;
use crate::targeting::TargetTuning;
use crate::types::{Vec2, Vec2f};

/// Tuning for one chase session. Any field missing from a JSON file keeps its
/// default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    pub tick_rate: u32,
    pub cell_size: f32,
    pub padding: Vec2f,
    pub agent_size: f32,
    pub center_tolerance_ratio: f32,
    pub hitbox_scale: f32,
    pub ambush_lookahead: i32,
    pub flank_lookahead: i32,
    pub shy_distance: f32,
    pub shy_corner: Option<Vec2>,
    /// Indexed by ghost in fixed update order.
    pub release_delays_secs: [f32; 4],
    pub house_swap_secs: f32,
    pub frightened_blink_window_secs: f32,
    pub frightened_blink_interval_secs: f32,
    pub score_display_secs: f32,
    pub eyes_speed_multiplier: f32,
    pub level: u32,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            cell_size: CELL_SIZE,
            padding: Vec2f::default(),
            agent_size: CELL_SIZE,
            center_tolerance_ratio: CENTER_TOLERANCE_RATIO,
            hitbox_scale: HITBOX_SCALE,
            ambush_lookahead: AMBUSH_LOOKAHEAD,
            flank_lookahead: FLANK_LOOKAHEAD,
            shy_distance: SHY_DISTANCE,
            shy_corner: None,
            release_delays_secs: RELEASE_DELAYS_SECS,
            house_swap_secs: HOUSE_SWAP_SECS,
            frightened_blink_window_secs: FRIGHTENED_BLINK_WINDOW_SECS,
            frightened_blink_interval_secs: FRIGHTENED_BLINK_INTERVAL_SECS,
            score_display_secs: SCORE_DISPLAY_SECS,
            eyes_speed_multiplier: EYES_SPEED_MULTIPLIER,
            level: 1,
        }
    }
}

impl ChaseConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: ChaseConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    pub fn center_tolerance(&self) -> f32 {
        self.cell_size * self.center_tolerance_ratio
    }

    /// Largest distance any agent can cover in one tick at any level.
    pub fn fastest_step(&self) -> f32 {
        MAX_SPEED * MAX_GHOST_SPEED_RATIO * self.eyes_speed_multiplier.max(1.0) * self.tick_secs()
    }

    pub fn target_tuning(&self) -> TargetTuning {
        TargetTuning {
            ambush_lookahead: self.ambush_lookahead,
            flank_lookahead: self.flank_lookahead,
            shy_distance: self.shy_distance,
            shy_corner: self.shy_corner,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".to_string()));
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.agent_size.is_nan() || self.agent_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "agent_size must be positive, got {}",
                self.agent_size
            )));
        }
        let ratio = self.center_tolerance_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio > 0.5 {
            return Err(ConfigError::Invalid(format!(
                "center_tolerance_ratio must be in (0, 0.5], got {ratio}"
            )));
        }
        if self.hitbox_scale.is_nan() || self.hitbox_scale <= 0.0 {
            return Err(ConfigError::Invalid("hitbox_scale must be positive".to_string()));
        }
        if self.level == 0 {
            return Err(ConfigError::Invalid("level numbers start at 1".to_string()));
        }
        let timers = [
            self.house_swap_secs,
            self.frightened_blink_window_secs,
            self.frightened_blink_interval_secs,
            self.score_display_secs,
        ];
        if timers
            .iter()
            .chain(self.release_delays_secs.iter())
            .any(|secs| secs.is_nan() || *secs < 0.0)
        {
            return Err(ConfigError::Invalid("timer durations must not be negative".to_string()));
        }
        let step = self.fastest_step();
        let band = self.center_tolerance() * 2.0;
        if step > band {
            return Err(ConfigError::Invalid(format!(
                "fastest per-tick step {step:.2} exceeds the centering band {band:.2}"
            )));
        }
        Ok(())
    }
}
