use crate::constants::{AMBUSH_LOOKAHEAD, FLANK_LOOKAHEAD, SHY_DISTANCE};
use crate::grid_map::GridMap;
use crate::types::{GhostKind, PlayerSnapshot, Vec2};

/// How a chasing agent picks the cell it paths toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStrategy {
    Chaser,
    Ambusher,
    Flanker,
    Shy,
}

impl TargetStrategy {
    pub fn for_kind(kind: GhostKind) -> Self {
        match kind {
            GhostKind::Blinky => TargetStrategy::Chaser,
            GhostKind::Pinky => TargetStrategy::Ambusher,
            GhostKind::Inky => TargetStrategy::Flanker,
            GhostKind::Clyde => TargetStrategy::Shy,
        }
    }

    /// Agent whose cell the strategy mirrors around, if any.
    pub fn reference_kind(self) -> Option<GhostKind> {
        match self {
            TargetStrategy::Flanker => Some(GhostKind::Blinky),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetTuning {
    pub ambush_lookahead: i32,
    pub flank_lookahead: i32,
    pub shy_distance: f32,
    /// Retreat cell for [`TargetStrategy::Shy`]; bottom-left when unset.
    pub shy_corner: Option<Vec2>,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            ambush_lookahead: AMBUSH_LOOKAHEAD,
            flank_lookahead: FLANK_LOOKAHEAD,
            shy_distance: SHY_DISTANCE,
            shy_corner: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TargetContext<'a> {
    pub map: &'a GridMap,
    pub agent_cell: Vec2,
    pub player: Option<PlayerSnapshot>,
    pub reference_cell: Option<Vec2>,
    pub tuning: &'a TargetTuning,
}

/// Picks the target cell. Missing inputs fall back to the agent's own cell,
/// which keeps the agent where it is.
pub fn select_target(strategy: TargetStrategy, ctx: &TargetContext<'_>) -> Vec2 {
    let Some(player) = ctx.player else {
        return ctx.agent_cell;
    };
    let map = ctx.map;
    match strategy {
        TargetStrategy::Chaser => player.cell,
        TargetStrategy::Ambusher => {
            map.clamp_col_row(player.cell.step(player.facing, ctx.tuning.ambush_lookahead))
        }
        TargetStrategy::Flanker => {
            let Some(reference) = ctx.reference_cell else {
                return ctx.agent_cell;
            };
            let pivot = player.cell.step(player.facing, ctx.tuning.flank_lookahead);
            map.clamp_col_row(pivot * 2 - reference)
        }
        TargetStrategy::Shy => {
            if ctx.agent_cell.euclidean(player.cell) >= ctx.tuning.shy_distance {
                player.cell
            } else {
                let corner = ctx
                    .tuning
                    .shy_corner
                    .unwrap_or(Vec2::new(0, map.rows() - 1));
                map.clamp_col_row(corner)
            }
        }
    }
}
