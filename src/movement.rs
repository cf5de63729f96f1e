use crate::grid_map::GridMap;
use crate::types::{Aabb, Direction, Vec2, Vec2f};

#[derive(Clone, Debug)]
pub struct Mover {
    aabb: Aabb,
    spawn_center: Vec2f,
    spawn_direction: Direction,
    direction: Direction,
    speed: f32,
    tolerance: f32,
    visit_cell: Option<usize>,
    turned_this_visit: bool,
}

impl Mover {
    pub fn new(
        map: &GridMap,
        spawn: Vec2,
        direction: Direction,
        size: f32,
        speed: f32,
        tolerance_ratio: f32,
    ) -> Self {
        let spawn_center = map.col_row_to_center(spawn);
        Self {
            aabb: Aabb::centered_at(spawn_center, size, size),
            spawn_center,
            spawn_direction: direction,
            direction,
            speed,
            tolerance: map.cell_size() * tolerance_ratio,
            visit_cell: map.col_row_to_index(spawn),
            turned_this_visit: false,
        }
    }

    pub fn reset(&mut self, map: &GridMap) {
        self.aabb.set_center(self.spawn_center);
        self.direction = self.spawn_direction;
        self.visit_cell = map.col_row_to_index(map.coords_to_col_row(self.spawn_center));
        self.turned_this_visit = false;
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn center(&self) -> Vec2f {
        self.aabb.center()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn cell(&self, map: &GridMap) -> Vec2 {
        map.coords_to_col_row(self.center())
    }

    pub fn set_center(&mut self, center: Vec2f, map: &GridMap) {
        self.aabb.set_center(center);
        self.sync_visit(map);
    }

    pub fn place_at_cell_center(&mut self, map: &GridMap) {
        let center = map.col_row_to_center(self.cell(map));
        self.set_center(center, map);
    }

    pub fn did_reach_cell_center(&self, map: &GridMap) -> bool {
        let cell_center = map.col_row_to_center(self.cell(map));
        self.center().distance(cell_center) <= self.tolerance
    }

    fn progress_along(&self, map: &GridMap, dir: Direction) -> f32 {
        let offset = self.center() - map.col_row_to_center(self.cell(map));
        let v = dir.vector();
        offset.x * v.x as f32 + offset.y * v.y as f32
    }

    // The next cell only matters once the box is inside the centering band.
    pub fn is_movable_direction(&self, dir: Direction, map: &GridMap) -> bool {
        let cell = self.cell(map);
        if self.progress_along(map, dir) < -self.tolerance {
            return map.is_walkable(cell);
        }
        map.is_walkable(cell.step(dir, 1))
    }

    pub fn is_orthogonal_turn(&self, dir: Direction) -> bool {
        dir.is_perpendicular(self.direction)
    }

    /// Perpendicular turns need the box centered and at most one per cell visit.
    pub fn try_turn(&mut self, dir: Direction, map: &GridMap) -> bool {
        if !self.is_orthogonal_turn(dir) {
            self.direction = dir;
            return true;
        }
        self.sync_visit(map);
        if self.turned_this_visit || !self.did_reach_cell_center(map) {
            return false;
        }
        let cell = self.cell(map);
        if !map.is_walkable(cell.step(dir, 1)) {
            return false;
        }
        self.aabb.set_center(map.col_row_to_center(cell));
        self.direction = dir;
        self.turned_this_visit = true;
        true
    }

    pub fn reverse_direction(&mut self) {
        self.direction = self.direction.opposite();
    }

    pub fn opposite_direction(&self) -> Direction {
        self.direction.opposite()
    }

    pub fn set_direction_by_target(&mut self, target: Vec2f) {
        let delta = target - self.center();
        if delta.x == 0.0 && delta.y == 0.0 {
            return;
        }
        self.direction = if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };
    }

    pub fn step(&mut self, dt: f32, map: &GridMap) -> bool {
        self.advance(self.speed * dt, map)
    }

    /// Like [`Mover::step`] but never passes `target` along the travel axis.
    pub fn step_toward(&mut self, dt: f32, target: Vec2f, map: &GridMap) -> bool {
        let v = self.direction.vector();
        let delta = target - self.center();
        let remaining = delta.x * v.x as f32 + delta.y * v.y as f32;
        if remaining <= 0.0 {
            return false;
        }
        self.advance((self.speed * dt).min(remaining), map)
    }

    pub fn step_confined(&mut self, dt: f32, map: &GridMap, anchor: Vec2f, radius: f32) -> bool {
        let moved = self.advance(self.speed * dt, map);
        let mut center = self.center();
        if self.direction.is_horizontal() {
            center.x = center.x.clamp(anchor.x - radius, anchor.x + radius);
        } else {
            center.y = center.y.clamp(anchor.y - radius, anchor.y + radius);
        }
        self.aabb.set_center(center);
        moved
    }

    fn advance(&mut self, distance: f32, map: &GridMap) -> bool {
        if distance <= 0.0 {
            return false;
        }
        let center = self.center();
        let cell = self.cell(map);
        let cell_center = map.col_row_to_center(cell);
        let v = self.direction.vector();
        let horizontal = self.direction.is_horizontal();
        let mut next = Vec2f {
            x: center.x + v.x as f32 * distance,
            y: center.y + v.y as f32 * distance,
        };

        if !map.is_walkable(cell.step(self.direction, 1)) {
            let progress_now = self.progress_along(map, self.direction);
            let progress_next = if horizontal {
                (next.x - cell_center.x) * v.x as f32
            } else {
                (next.y - cell_center.y) * v.y as f32
            };
            if progress_next > 0.0 {
                if progress_now >= 0.0 {
                    return false;
                }
                if horizontal {
                    next.x = cell_center.x;
                } else {
                    next.y = cell_center.y;
                }
            }
        }

        let line = map.col_row_to_center(map.coords_to_col_row(next));
        if horizontal {
            next.y = line.y;
        } else {
            next.x = line.x;
        }
        self.aabb.set_center(next);
        self.sync_visit(map);
        true
    }

    fn sync_visit(&mut self, map: &GridMap) {
        let index = map.col_row_to_index(self.cell(map));
        if index != self.visit_cell {
            self.visit_cell = index;
            self.turned_this_visit = false;
        }
    }
}
