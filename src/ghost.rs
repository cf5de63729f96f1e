use tracing::{debug, trace};

use crate::config::ChaseConfig;
use crate::constants::{GhostSpawn, HOUSE_BOB_RATIO};
use crate::grid_map::GridMap;
use crate::level::Level;
use crate::movement::Mover;
use crate::pathfinder::{Path, Pathfinder};
use crate::rng::Rng;
use crate::targeting::{select_target, TargetContext, TargetStrategy, TargetTuning};
use crate::timer::CountdownTimer;
use crate::types::{AgentEvent, Direction, GhostKind, GhostStateTag, GhostView, PlayerSnapshot, Vec2};

/// Candidate order for frightened turns.
const FRIGHTENED_ORDER: [Direction; 4] = [
    Direction::Left,
    Direction::Up,
    Direction::Down,
    Direction::Right,
];

const ARRIVAL_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeTarget {
    Chasing,
    Housing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostTrigger {
    HouseTimerElapsed,
    PowerPellet,
    FrightenedElapsed,
    Captured,
    ScoreShown,
    ArrivedHome,
    Stop,
    Resume(ResumeTarget),
}

/// The transition table. `None` means the trigger is ignored in that state.
pub fn transition(from: GhostStateTag, trigger: GhostTrigger) -> Option<GhostStateTag> {
    use GhostStateTag as S;
    use GhostTrigger as T;

    match (from, trigger) {
        (_, T::Stop) => Some(S::Stopped),
        (S::Stopped, T::Resume(ResumeTarget::Chasing)) => Some(S::Chasing),
        (S::Stopped, T::Resume(ResumeTarget::Housing)) => Some(S::Housing),
        (S::Housing, T::HouseTimerElapsed) => Some(S::Chasing),
        (S::Chasing | S::Frightened, T::PowerPellet) => Some(S::Frightened),
        (S::Frightened, T::FrightenedElapsed) => Some(S::Chasing),
        (S::Frightened, T::Captured) => Some(S::ShowingScore),
        (S::ShowingScore, T::ScoreShown) => Some(S::Eyes),
        (S::Eyes, T::ArrivedHome) => Some(S::Housing),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GhostState {
    Housing {
        release: CountdownTimer,
        swap: CountdownTimer,
    },
    Chasing,
    Frightened {
        remaining: CountdownTimer,
        blink: CountdownTimer,
        blink_on: bool,
    },
    ShowingScore {
        timer: CountdownTimer,
    },
    Eyes,
    Stopped,
}

impl GhostState {
    pub fn tag(&self) -> GhostStateTag {
        match self {
            GhostState::Housing { .. } => GhostStateTag::Housing,
            GhostState::Chasing => GhostStateTag::Chasing,
            GhostState::Frightened { .. } => GhostStateTag::Frightened,
            GhostState::ShowingScore { .. } => GhostStateTag::ShowingScore,
            GhostState::Eyes => GhostStateTag::Eyes,
            GhostState::Stopped => GhostStateTag::Stopped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GhostTiming {
    release_delay_secs: f32,
    house_swap_secs: f32,
    frightened_secs: f32,
    blink_window_secs: f32,
    blink_interval_secs: f32,
    score_display_secs: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GhostSpeeds {
    normal: f32,
    frightened: f32,
    eyes: f32,
}

impl GhostSpeeds {
    fn for_level(level: &Level, eyes_multiplier: f32) -> Self {
        Self {
            normal: level.ghost_speed(),
            frightened: level.frightened_speed(),
            eyes: level.ghost_speed() * eyes_multiplier,
        }
    }
}

pub struct GhostContext<'a> {
    pub map: &'a GridMap,
    pub pathfinder: &'a mut Pathfinder,
    pub rng: &'a mut Rng,
    pub player: Option<PlayerSnapshot>,
    pub reference_cell: Option<Vec2>,
    pub tuning: &'a TargetTuning,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    spawn: GhostSpawn,
    strategy: TargetStrategy,
    mover: Mover,
    state: GhostState,
    path: Path,
    path_index: usize,
    between_tiles: bool,
    path_blocked: bool,
    last_request: Option<(Vec2, Vec2)>,
    last_decision_cell: Option<Vec2>,
    path_requests: u32,
    speeds: GhostSpeeds,
    eyes_multiplier: f32,
    timing: GhostTiming,
}

impl Ghost {
    pub fn new(spawn: GhostSpawn, map: &GridMap, config: &ChaseConfig, level: &Level) -> Self {
        let speeds = GhostSpeeds::for_level(level, config.eyes_speed_multiplier);
        let timing = GhostTiming {
            release_delay_secs: config.release_delays_secs[spawn.kind.index()],
            house_swap_secs: config.house_swap_secs,
            frightened_secs: level.frightened_secs(),
            blink_window_secs: config.frightened_blink_window_secs,
            blink_interval_secs: config.frightened_blink_interval_secs,
            score_display_secs: config.score_display_secs,
        };
        let mover = Mover::new(
            map,
            spawn.cell,
            spawn.direction,
            config.agent_size,
            speeds.normal,
            config.center_tolerance_ratio,
        );
        Self {
            spawn,
            strategy: TargetStrategy::for_kind(spawn.kind),
            mover,
            state: housing_state(&timing),
            path: Path::new(),
            path_index: 0,
            between_tiles: false,
            path_blocked: false,
            last_request: None,
            last_decision_cell: None,
            path_requests: 0,
            speeds,
            eyes_multiplier: config.eyes_speed_multiplier,
            timing,
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.spawn.kind
    }

    pub fn strategy(&self) -> TargetStrategy {
        self.strategy
    }

    pub fn spawn(&self) -> GhostSpawn {
        self.spawn
    }

    pub fn state(&self) -> &GhostState {
        &self.state
    }

    pub fn state_tag(&self) -> GhostStateTag {
        self.state.tag()
    }

    pub fn mover(&self) -> &Mover {
        &self.mover
    }

    pub fn cell(&self, map: &GridMap) -> Vec2 {
        self.mover.cell(map)
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn last_request(&self) -> Option<(Vec2, Vec2)> {
        self.last_request
    }

    pub fn path_requests(&self) -> u32 {
        self.path_requests
    }

    pub fn is_blinking(&self) -> bool {
        matches!(self.state, GhostState::Frightened { blink_on: true, .. })
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            kind: self.kind(),
            aabb: self.mover.aabb(),
            dir: self.mover.direction(),
            state: self.state_tag(),
            frightened_blink: self.is_blinking(),
        }
    }

    pub fn set_level(&mut self, level: &Level) {
        self.speeds = GhostSpeeds::for_level(level, self.eyes_multiplier);
        self.timing.frightened_secs = level.frightened_secs();
        self.mover.set_speed(self.speed_for(self.state_tag()));
    }

    pub fn reset(&mut self, map: &GridMap) {
        self.mover.reset(map);
        self.clear_path();
        self.last_decision_cell = None;
        self.state = housing_state(&self.timing);
        self.mover.set_speed(self.speeds.normal);
    }

    pub fn apply(&mut self, trigger: GhostTrigger, map: &GridMap) -> bool {
        let from = self.state_tag();
        let Some(to) = transition(from, trigger) else {
            trace!(kind = ?self.kind(), state = ?from, ?trigger, "trigger ignored");
            return false;
        };
        debug!(kind = ?self.kind(), ?from, ?to, ?trigger, "ghost transition");
        self.enter(to, map);
        true
    }

    fn enter(&mut self, tag: GhostStateTag, map: &GridMap) {
        self.clear_path();
        self.mover.set_speed(self.speed_for(tag));
        self.state = match tag {
            GhostStateTag::Housing => {
                self.mover.reset(map);
                housing_state(&self.timing)
            }
            GhostStateTag::Chasing => GhostState::Chasing,
            GhostStateTag::Frightened => {
                self.last_decision_cell = None;
                GhostState::Frightened {
                    remaining: CountdownTimer::new(self.timing.frightened_secs),
                    blink: CountdownTimer::new(self.timing.blink_interval_secs),
                    blink_on: false,
                }
            }
            GhostStateTag::ShowingScore => GhostState::ShowingScore {
                timer: CountdownTimer::new(self.timing.score_display_secs),
            },
            GhostStateTag::Eyes => {
                self.mover.place_at_cell_center(map);
                GhostState::Eyes
            }
            GhostStateTag::Stopped => GhostState::Stopped,
        };
    }

    fn speed_for(&self, tag: GhostStateTag) -> f32 {
        match tag {
            GhostStateTag::Frightened => self.speeds.frightened,
            GhostStateTag::Eyes => self.speeds.eyes,
            _ => self.speeds.normal,
        }
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.between_tiles = false;
        self.path_blocked = false;
        self.last_request = None;
    }

    pub fn update(&mut self, dt: f32, ctx: &mut GhostContext<'_>) -> Option<AgentEvent> {
        match self.state.tag() {
            GhostStateTag::Housing => self.update_housing(dt, ctx.map),
            GhostStateTag::Chasing => self.update_chasing(dt, ctx),
            GhostStateTag::Frightened => self.update_frightened(dt, ctx.map, ctx.rng),
            GhostStateTag::ShowingScore => self.update_showing_score(dt, ctx.map),
            GhostStateTag::Eyes => return self.update_eyes(dt, ctx.map, ctx.pathfinder),
            GhostStateTag::Stopped => {}
        }
        None
    }

    fn update_housing(&mut self, dt: f32, map: &GridMap) {
        let GhostState::Housing { release, swap } = &mut self.state else {
            return;
        };
        swap.update(dt);
        release.update(dt);
        let swapped = swap.did_finish();
        let released = release.did_finish();

        if swapped {
            self.mover.reverse_direction();
        }
        let anchor = map.col_row_to_center(self.spawn.cell);
        self.mover
            .step_confined(dt, map, anchor, map.cell_size() * HOUSE_BOB_RATIO);
        if released {
            self.apply(GhostTrigger::HouseTimerElapsed, map);
        }
    }

    fn update_chasing(&mut self, dt: f32, ctx: &mut GhostContext<'_>) {
        if !self.between_tiles {
            let target = select_target(
                self.strategy,
                &TargetContext {
                    map: ctx.map,
                    agent_cell: self.mover.cell(ctx.map),
                    player: ctx.player,
                    reference_cell: ctx.reference_cell,
                    tuning: ctx.tuning,
                },
            );
            self.request_path(ctx.map, ctx.pathfinder, target);
        }
        self.follow_path(dt, ctx.map);
    }

    fn update_frightened(&mut self, dt: f32, map: &GridMap, rng: &mut Rng) {
        let GhostState::Frightened {
            remaining,
            blink,
            blink_on,
        } = &mut self.state
        else {
            return;
        };
        remaining.update(dt);
        if remaining.did_finish() {
            self.apply(GhostTrigger::FrightenedElapsed, map);
            return;
        }
        if remaining.seconds_to_finish() <= self.timing.blink_window_secs {
            blink.update(dt);
            if blink.did_finish() {
                *blink_on = !*blink_on;
            }
        }

        let cell = self.mover.cell(map);
        if self.mover.did_reach_cell_center(map) && self.last_decision_cell != Some(cell) {
            self.last_decision_cell = Some(cell);
            let dir = choose_frightened_direction(&self.mover, map, rng);
            self.mover.place_at_cell_center(map);
            self.mover.try_turn(dir, map);
        }
        self.mover.step(dt, map);
    }

    fn update_showing_score(&mut self, dt: f32, map: &GridMap) {
        let GhostState::ShowingScore { timer } = &mut self.state else {
            return;
        };
        timer.update(dt);
        if timer.did_finish() {
            self.apply(GhostTrigger::ScoreShown, map);
        }
    }

    fn update_eyes(
        &mut self,
        dt: f32,
        map: &GridMap,
        pathfinder: &mut Pathfinder,
    ) -> Option<AgentEvent> {
        if self.last_request.is_none() || self.path_blocked {
            self.request_path(map, pathfinder, self.spawn.cell);
        }
        self.follow_path(dt, map);
        if self.path_index < self.path.len() {
            return None;
        }
        self.apply(GhostTrigger::ArrivedHome, map);
        Some(AgentEvent::ArrivedHome)
    }

    // An off-center agent walks back to its own cell center first.
    fn request_path(&mut self, map: &GridMap, pathfinder: &mut Pathfinder, target: Vec2) {
        let cell = self.mover.cell(map);
        let exhausted = self.path_index >= self.path.len();
        if exhausted && self.last_request == Some((cell, target)) {
            return;
        }
        let mut path = pathfinder.find_path(map, cell, target);
        let cell_center = map.col_row_to_center(cell);
        if self.mover.center().distance(cell_center) > ARRIVAL_EPSILON {
            path.insert(0, cell);
        }
        self.path = path;
        self.path_index = 0;
        self.path_blocked = false;
        self.last_request = Some((cell, target));
        self.path_requests += 1;
    }

    fn follow_path(&mut self, dt: f32, map: &GridMap) {
        let Some(&next) = self.path.get(self.path_index) else {
            self.between_tiles = false;
            return;
        };
        let waypoint = map.col_row_to_center(next);
        self.mover.set_direction_by_target(waypoint);
        let moved = self.mover.step_toward(dt, waypoint, map);
        if self.mover.center().distance(waypoint) <= ARRIVAL_EPSILON {
            self.mover.set_center(waypoint, map);
            self.path_index += 1;
            self.between_tiles = false;
        } else {
            // Door closed mid-path.
            self.path_blocked = !moved;
            self.between_tiles = moved;
        }
    }
}

fn housing_state(timing: &GhostTiming) -> GhostState {
    GhostState::Housing {
        release: CountdownTimer::new(timing.release_delay_secs),
        swap: CountdownTimer::new(timing.house_swap_secs),
    }
}

/// Uniform pick among legal non-reversing directions; reverses only at a
/// dead end.
pub fn choose_frightened_direction(mover: &Mover, map: &GridMap, rng: &mut Rng) -> Direction {
    let reverse = mover.opposite_direction();
    let options: Vec<Direction> = FRIGHTENED_ORDER
        .into_iter()
        .filter(|dir| *dir != reverse && mover.is_movable_direction(*dir, map))
        .collect();
    rng.pick(&options).unwrap_or(reverse)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::config::ChaseConfig;
    use crate::constants::{default_ghost_spawns, GhostSpawn, CELL_SIZE, DEFAULT_MAZE};
    use crate::grid_map::GridMap;
    use crate::level::Level;
    use crate::movement::Mover;
    use crate::pathfinder::Pathfinder;
    use crate::rng::Rng;
    use crate::targeting::TargetTuning;
    use crate::types::{
        AgentEvent, Direction, GhostKind, GhostStateTag, PlayerSnapshot, Vec2, Vec2f,
    };

    use super::{
        choose_frightened_direction, transition, Ghost, GhostContext, GhostTrigger, ResumeTarget,
    };

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        map: GridMap,
        pathfinder: Pathfinder,
        rng: Rng,
        tuning: TargetTuning,
        player: Option<PlayerSnapshot>,
    }

    impl Harness {
        fn new(map: GridMap) -> Self {
            let pathfinder = Pathfinder::new(&map);
            Self {
                map,
                pathfinder,
                rng: Rng::new(7),
                tuning: TargetTuning::default(),
                player: None,
            }
        }

        fn open(cols: usize, rows: usize) -> Self {
            Self::new(GridMap::open(cols, rows, CELL_SIZE).expect("grid"))
        }

        fn ghost(&self, kind: GhostKind, cell: Vec2, direction: Direction) -> Ghost {
            let spawn = GhostSpawn {
                kind,
                cell,
                direction,
            };
            Ghost::new(spawn, &self.map, &ChaseConfig::default(), &Level::default())
        }

        fn put_player(&mut self, cell: Vec2) {
            self.player = Some(PlayerSnapshot {
                cell,
                facing: Direction::Left,
                center: self.map.col_row_to_center(cell),
            });
        }

        fn tick(&mut self, ghost: &mut Ghost) -> Option<AgentEvent> {
            let mut ctx = GhostContext {
                map: &self.map,
                pathfinder: &mut self.pathfinder,
                rng: &mut self.rng,
                player: self.player,
                reference_cell: None,
                tuning: &self.tuning,
            };
            ghost.update(DT, &mut ctx)
        }
    }

    #[test]
    fn table_covers_every_listed_transition() {
        use GhostStateTag as S;
        use GhostTrigger as T;

        let expected = [
            (S::Housing, T::HouseTimerElapsed, S::Chasing),
            (S::Chasing, T::PowerPellet, S::Frightened),
            (S::Frightened, T::PowerPellet, S::Frightened),
            (S::Frightened, T::FrightenedElapsed, S::Chasing),
            (S::Frightened, T::Captured, S::ShowingScore),
            (S::ShowingScore, T::ScoreShown, S::Eyes),
            (S::Eyes, T::ArrivedHome, S::Housing),
            (S::Stopped, T::Resume(ResumeTarget::Chasing), S::Chasing),
            (S::Stopped, T::Resume(ResumeTarget::Housing), S::Housing),
        ];
        for (from, trigger, to) in expected {
            assert_eq!(transition(from, trigger), Some(to), "{from:?} + {trigger:?}");
        }
    }

    #[test]
    fn every_state_can_stop_and_only_stopped_resumes() {
        use GhostStateTag as S;

        for from in [
            S::Housing,
            S::Chasing,
            S::Frightened,
            S::ShowingScore,
            S::Eyes,
            S::Stopped,
        ] {
            assert_eq!(transition(from, GhostTrigger::Stop), Some(S::Stopped));
            let resume = transition(from, GhostTrigger::Resume(ResumeTarget::Chasing));
            assert_eq!(resume.is_some(), from == S::Stopped);
        }
    }

    #[test]
    fn unlisted_triggers_are_ignored() {
        use GhostStateTag as S;
        use GhostTrigger as T;

        assert_eq!(transition(S::Housing, T::PowerPellet), None);
        assert_eq!(transition(S::Chasing, T::Captured), None);
        assert_eq!(transition(S::Eyes, T::PowerPellet), None);
        assert_eq!(transition(S::ShowingScore, T::Captured), None);
        assert_eq!(transition(S::Stopped, T::HouseTimerElapsed), None);
    }

    #[test]
    fn chasing_distance_shrinks_with_every_new_path() {
        let mut h = Harness::open(10, 10);
        let goal = Vec2::new(9, 9);
        h.put_player(goal);
        let mut ghost = h.ghost(GhostKind::Blinky, Vec2::new(0, 0), Direction::Right);
        assert!(ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map));

        let mut distances = Vec::new();
        let mut seen = 0;
        for _ in 0..2_000 {
            h.tick(&mut ghost);
            if ghost.path_requests() != seen {
                seen = ghost.path_requests();
                let (origin, _) = ghost.last_request().expect("request recorded");
                distances.push(origin.manhattan(goal));
            }
        }

        assert_eq!(distances.first(), Some(&18));
        assert_eq!(distances.last(), Some(&0));
        assert!(distances.windows(2).all(|w| w[1] < w[0]), "{distances:?}");
        assert_eq!(ghost.cell(&h.map), goal);
        assert_eq!(ghost.mover().center(), h.map.col_row_to_center(goal));
    }

    #[test]
    fn exhausted_identical_request_is_not_repeated() {
        let mut h = Harness::open(6, 6);
        h.put_player(Vec2::new(2, 2));
        let mut ghost = h.ghost(GhostKind::Blinky, Vec2::new(2, 2), Direction::Right);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        for _ in 0..30 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.path_requests(), 1);
        assert!(ghost.path().is_empty());
    }

    #[test]
    fn off_center_request_recenters_first() {
        let mut h = Harness::open(6, 6);
        let cell = Vec2::new(2, 2);
        h.put_player(cell);
        let mut ghost = h.ghost(GhostKind::Blinky, cell, Direction::Right);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        let center = h.map.col_row_to_center(cell);
        ghost
            .mover
            .set_center(Vec2f::new(center.x + 3.0, center.y), &h.map);

        h.tick(&mut ghost);
        assert_eq!(ghost.path(), &[cell]);
        for _ in 0..10 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.mover().center(), center);
        assert_eq!(ghost.path_index(), 1);
    }

    #[test]
    fn frightened_choice_is_uniform_at_an_intersection() {
        let map = GridMap::open(3, 3, CELL_SIZE).expect("grid");
        let mover = Mover::new(&map, Vec2::new(1, 1), Direction::Right, CELL_SIZE, 60.0, 0.25);
        let mut counts: HashMap<Direction, u32> = HashMap::new();
        for seed in 0..3_000u32 {
            let mut rng = Rng::new(seed.wrapping_mul(2_654_435_761));
            *counts
                .entry(choose_frightened_direction(&mover, &map, &mut rng))
                .or_default() += 1;
        }
        assert_eq!(counts.get(&Direction::Left), None);
        for dir in [Direction::Up, Direction::Down, Direction::Right] {
            let count = counts.get(&dir).copied().unwrap_or(0);
            assert!((850..=1_150).contains(&count), "{dir:?}: {count}");
        }
    }

    #[test]
    fn frightened_reverses_only_at_dead_end() {
        let map = GridMap::from_rows(&["#####", "#...#", "#####"], CELL_SIZE, Vec2f::default())
            .expect("corridor");
        let mover = Mover::new(&map, Vec2::new(3, 1), Direction::Right, CELL_SIZE, 60.0, 0.25);
        let mut rng = Rng::new(1);
        for _ in 0..20 {
            assert_eq!(
                choose_frightened_direction(&mover, &map, &mut rng),
                Direction::Left
            );
        }
    }

    #[test]
    fn frightened_blinks_near_the_end_then_chases() {
        let mut h = Harness::open(10, 10);
        let mut ghost = h.ghost(GhostKind::Pinky, Vec2::new(4, 4), Direction::Right);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        assert!(ghost.apply(GhostTrigger::PowerPellet, &h.map));

        let mut blinked = false;
        for tick in 0..340 {
            h.tick(&mut ghost);
            assert_eq!(ghost.state_tag(), GhostStateTag::Frightened);
            if tick < 200 {
                assert!(!ghost.is_blinking(), "blinking at tick {tick}");
            }
            blinked |= ghost.is_blinking();
            assert!(h.map.is_walkable(ghost.cell(&h.map)));
        }
        assert!(blinked);
        for _ in 0..30 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.state_tag(), GhostStateTag::Chasing);
        assert!(!ghost.is_blinking());
    }

    #[test]
    fn capture_sends_eyes_home_into_housing() {
        let mut h = Harness::open(10, 10);
        let spawn = Vec2::new(5, 5);
        h.put_player(Vec2::new(0, 0));
        let mut ghost = h.ghost(GhostKind::Blinky, spawn, Direction::Right);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        for _ in 0..80 {
            h.tick(&mut ghost);
        }
        assert_ne!(ghost.cell(&h.map), spawn);

        ghost.apply(GhostTrigger::PowerPellet, &h.map);
        assert!(ghost.apply(GhostTrigger::Captured, &h.map));
        assert_eq!(ghost.state_tag(), GhostStateTag::ShowingScore);
        let frozen = ghost.mover().center();
        for _ in 0..30 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.mover().center(), frozen);

        let mut arrived = false;
        for _ in 0..600 {
            if h.tick(&mut ghost) == Some(AgentEvent::ArrivedHome) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(ghost.state_tag(), GhostStateTag::Housing);
        assert_eq!(ghost.mover().center(), h.map.col_row_to_center(spawn));
    }

    fn doored_loop() -> Harness {
        let map = GridMap::from_rows(&[".....", ".#-#.", "....."], CELL_SIZE, Vec2f::default())
            .expect("loop");
        Harness::new(map)
    }

    #[test]
    fn chasing_routes_around_a_door_closed_mid_path() {
        let mut h = doored_loop();
        let door = Vec2::new(2, 1);
        let goal = Vec2::new(2, 2);
        h.put_player(goal);
        let mut ghost = h.ghost(GhostKind::Blinky, Vec2::new(2, 0), Direction::Down);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        h.tick(&mut ghost);
        assert_eq!(ghost.path().first(), Some(&door));

        assert!(h.map.set_door_walkable(door, false));
        for _ in 0..600 {
            h.tick(&mut ghost);
            assert_ne!(ghost.cell(&h.map), door);
            if ghost.cell(&h.map) == goal {
                break;
            }
        }
        assert_eq!(ghost.cell(&h.map), goal);
    }

    #[test]
    fn eyes_route_around_a_door_closed_mid_path() {
        let mut h = doored_loop();
        let door = Vec2::new(2, 1);
        let home = Vec2::new(2, 2);
        let mut ghost = h.ghost(GhostKind::Blinky, home, Direction::Up);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        let start = h.map.col_row_to_center(Vec2::new(2, 0));
        ghost.mover.set_center(start, &h.map);
        ghost.apply(GhostTrigger::PowerPellet, &h.map);
        ghost.apply(GhostTrigger::Captured, &h.map);
        ghost.apply(GhostTrigger::ScoreShown, &h.map);
        assert_eq!(ghost.state_tag(), GhostStateTag::Eyes);
        h.tick(&mut ghost);
        assert_eq!(ghost.path(), &[door, home]);

        assert!(h.map.set_door_walkable(door, false));
        let mut arrived = false;
        for _ in 0..2_000 {
            let event = h.tick(&mut ghost);
            assert_ne!(ghost.cell(&h.map), door);
            if event == Some(AgentEvent::ArrivedHome) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(ghost.state_tag(), GhostStateTag::Housing);
    }

    #[test]
    fn housing_bobs_inside_spawn_cell_until_released() {
        let map = GridMap::from_rows(&DEFAULT_MAZE, CELL_SIZE, Vec2f::default()).expect("maze");
        let mut h = Harness::new(map);
        let spawn = default_ghost_spawns()[GhostKind::Inky.index()];
        let mut ghost = Ghost::new(spawn, &h.map, &ChaseConfig::default(), &Level::default());
        let anchor = h.map.col_row_to_center(spawn.cell);

        for _ in 0..230 {
            h.tick(&mut ghost);
            assert_eq!(ghost.state_tag(), GhostStateTag::Housing);
            let offset = ghost.mover().center() - anchor;
            assert!(offset.x.abs() <= CELL_SIZE * 0.5 && offset.y.abs() <= CELL_SIZE * 0.5);
        }
        for _ in 0..20 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.state_tag(), GhostStateTag::Chasing);
    }

    #[test]
    fn stopped_is_inert_until_resumed() {
        let mut h = Harness::open(8, 8);
        h.put_player(Vec2::new(7, 7));
        let mut ghost = h.ghost(GhostKind::Blinky, Vec2::new(0, 0), Direction::Right);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        for _ in 0..5 {
            h.tick(&mut ghost);
        }
        assert!(ghost.apply(GhostTrigger::Stop, &h.map));
        let frozen = ghost.mover().center();
        for _ in 0..60 {
            h.tick(&mut ghost);
        }
        assert_eq!(ghost.mover().center(), frozen);
        assert!(!ghost.apply(GhostTrigger::PowerPellet, &h.map));

        assert!(ghost.apply(GhostTrigger::Resume(ResumeTarget::Chasing), &h.map));
        for _ in 0..30 {
            h.tick(&mut ghost);
        }
        assert_ne!(ghost.mover().center(), frozen);
    }

    #[test]
    fn reset_returns_to_housing_at_spawn() {
        let mut h = Harness::open(8, 8);
        h.put_player(Vec2::new(7, 7));
        let spawn = Vec2::new(1, 1);
        let mut ghost = h.ghost(GhostKind::Clyde, spawn, Direction::Down);
        ghost.apply(GhostTrigger::HouseTimerElapsed, &h.map);
        for _ in 0..60 {
            h.tick(&mut ghost);
        }
        ghost.reset(&h.map);
        assert_eq!(ghost.state_tag(), GhostStateTag::Housing);
        assert_eq!(ghost.mover().center(), h.map.col_row_to_center(spawn));
        assert_eq!(ghost.mover().direction(), Direction::Down);
        assert!(ghost.path().is_empty());
    }
}
