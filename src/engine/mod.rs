use tracing::{debug, info};

use crate::config::ChaseConfig;
use crate::constants::{default_ghost_spawns, GhostSpawn, DEFAULT_MAZE};
use crate::error::MapError;
use crate::ghost::{Ghost, GhostContext, GhostTrigger, ResumeTarget};
use crate::grid_map::GridMap;
use crate::level::Level;
use crate::pathfinder::Pathfinder;
use crate::rng::Rng;
use crate::targeting::TargetTuning;
use crate::types::{AgentEvent, GhostKind, GhostView, PlayerSnapshot, Snapshot, Vec2};

mod collisions;

/// Owns the map and the agents and advances them one fixed tick at a time.
#[derive(Clone, Debug)]
pub struct ChaseEngine {
    pub config: ChaseConfig,

    map: GridMap,
    pathfinder: Pathfinder,
    rng: Rng,
    tuning: TargetTuning,
    ghosts: Vec<Ghost>,
    player: Option<PlayerSnapshot>,
    events: Vec<AgentEvent>,
    level: Level,
    tick_counter: u64,
    player_deaths: u32,
}

impl ChaseEngine {
    /// # Panics
    ///
    /// If `config.level` is 0. Run [`ChaseConfig::validate`] first.
    pub fn new(map: GridMap, config: ChaseConfig, spawns: &[GhostSpawn], seed: u32) -> Self {
        let level = Level::new(config.level);
        let ghosts = spawns
            .iter()
            .map(|spawn| Ghost::new(*spawn, &map, &config, &level))
            .collect();
        Self {
            pathfinder: Pathfinder::new(&map),
            rng: Rng::new(seed),
            tuning: config.target_tuning(),
            config,
            map,
            ghosts,
            player: None,
            events: Vec::new(),
            level,
            tick_counter: 0,
            player_deaths: 0,
        }
    }

    pub fn with_default_maze(config: ChaseConfig, seed: u32) -> Result<Self, MapError> {
        let map = GridMap::from_rows(&DEFAULT_MAZE, config.cell_size, config.padding)?;
        Ok(Self::new(map, config, &default_ghost_spawns(), seed))
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn player_deaths(&self) -> u32 {
        self.player_deaths
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, kind: GhostKind) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.kind() == kind)
    }

    pub fn set_player(&mut self, player: Option<PlayerSnapshot>) {
        self.player = player;
    }

    pub fn step(&mut self, dt: f32) {
        self.tick_counter += 1;
        for idx in 0..self.ghosts.len() {
            let reference_cell = self.ghosts[idx]
                .strategy()
                .reference_kind()
                .and_then(|kind| self.ghost(kind))
                .map(|ghost| ghost.cell(&self.map));
            let mut ctx = GhostContext {
                map: &self.map,
                pathfinder: &mut self.pathfinder,
                rng: &mut self.rng,
                player: self.player,
                reference_cell,
                tuning: &self.tuning,
            };
            if let Some(event) = self.ghosts[idx].update(dt, &mut ctx) {
                self.push_event(self.ghosts[idx].kind(), event);
            }
        }
        self.resolve_collisions();
    }

    pub fn apply(&mut self, kind: GhostKind, trigger: GhostTrigger) -> bool {
        let map = &self.map;
        self.ghosts
            .iter_mut()
            .find(|ghost| ghost.kind() == kind)
            .is_some_and(|ghost| ghost.apply(trigger, map))
    }

    /// Power-item trigger. Returns how many ghosts became frightened.
    pub fn frighten_all(&mut self) -> usize {
        self.apply_all(GhostTrigger::PowerPellet)
    }

    pub fn stop_all(&mut self) -> usize {
        self.apply_all(GhostTrigger::Stop)
    }

    pub fn resume_all(&mut self, target: ResumeTarget) -> usize {
        self.apply_all(GhostTrigger::Resume(target))
    }

    fn apply_all(&mut self, trigger: GhostTrigger) -> usize {
        let map = &self.map;
        let changed = self
            .ghosts
            .iter_mut()
            .map(|ghost| ghost.apply(trigger, map))
            .filter(|changed| *changed)
            .count();
        debug!(?trigger, changed, "trigger broadcast");
        changed
    }

    /// Every ghost back to its spawn pose in HOUSING. Pending events are kept.
    pub fn reset(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.reset(&self.map);
        }
    }

    pub fn advance_level(&mut self) -> Level {
        self.level = self.level.next();
        for ghost in &mut self.ghosts {
            ghost.set_level(&self.level);
        }
        info!(level = self.level.number(), "level advanced");
        self.level
    }

    pub fn toggle_door(&mut self, cell: Vec2, walkable: bool) -> bool {
        self.map.set_door_walkable(cell, walkable)
    }

    pub fn views(&self) -> Vec<GhostView> {
        self.ghosts.iter().map(Ghost::view).collect()
    }

    pub fn drain_events(&mut self) -> Vec<AgentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            level: self.level.number(),
            player_deaths: self.player_deaths,
            ghosts: self.views(),
            events: if include_events {
                self.drain_events()
            } else {
                Vec::new()
            },
        }
    }

    fn push_event(&mut self, kind: GhostKind, event: AgentEvent) {
        info!(?kind, ?event, tick = self.tick_counter, "agent event");
        self.events.push(event);
    }
}
