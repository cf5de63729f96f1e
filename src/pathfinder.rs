use std::collections::BTreeSet;

use crate::grid_map::GridMap;
use crate::types::Vec2;

pub type Path = Vec<Vec2>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SearchNode {
    g: i32,
    h: i32,
    is_open: bool,
    is_closed: bool,
    parent: Option<usize>,
}

impl SearchNode {
    fn f(&self) -> i32 {
        self.g + self.h
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: usize,
    pub reached_target: bool,
}

#[derive(Clone, Debug)]
pub struct Pathfinder {
    nodes: Vec<SearchNode>,
    // (f, cell index): equal costs always pop the lowest index.
    open: BTreeSet<(i32, usize)>,
    last_stats: SearchStats,
}

impl Pathfinder {
    pub fn new(map: &GridMap) -> Self {
        Self {
            nodes: vec![SearchNode::default(); map.cell_count()],
            open: BTreeSet::new(),
            last_stats: SearchStats::default(),
        }
    }

    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    pub fn find_path(&mut self, map: &GridMap, from: Vec2, to: Vec2) -> Path {
        let from = map.clamp_col_row(from);
        let to = map.clamp_col_row(to);
        self.reset(map.cell_count());

        let (Some(start), Some(target)) = (map.col_row_to_index(from), map.col_row_to_index(to))
        else {
            return Path::new();
        };

        self.nodes[start].h = from.manhattan(to);
        self.nodes[start].is_open = true;
        self.open.insert((self.nodes[start].f(), start));

        // Lowest heuristic seen so far, used when the target is unreachable.
        let mut best: Option<usize> = None;
        let mut expanded = 0usize;

        while let Some((_, current)) = self.open.pop_first() {
            expanded += 1;
            self.nodes[current].is_open = false;
            self.nodes[current].is_closed = true;

            if current == target {
                best = Some(current);
                break;
            }
            if best.map_or(true, |b| self.nodes[current].h < self.nodes[b].h) {
                best = Some(current);
            }

            let g = self.nodes[current].g + 1;
            for neighbour in neighbours(map, current).into_iter().flatten() {
                let node = self.nodes[neighbour];
                if node.is_closed {
                    continue;
                }
                if node.is_open && g >= node.g {
                    continue;
                }
                if node.is_open {
                    self.open.remove(&(node.f(), neighbour));
                }
                let Some(col_row) = map.index_to_col_row(neighbour) else {
                    continue;
                };
                let node = &mut self.nodes[neighbour];
                node.g = g;
                node.h = col_row.manhattan(to);
                node.parent = Some(current);
                node.is_open = true;
                self.open.insert((node.f(), neighbour));
            }
        }

        let reached_target = best == Some(target);
        self.last_stats = SearchStats {
            expanded,
            reached_target,
        };
        if !reached_target {
            tracing::debug!(
                from_col = from.x,
                from_row = from.y,
                to_col = to.x,
                to_row = to.y,
                expanded,
                "target unreachable, using closest expanded cell"
            );
        }

        best.map(|node| self.reconstruct(map, node)).unwrap_or_default()
    }

    fn reset(&mut self, cell_count: usize) {
        if self.nodes.len() != cell_count {
            self.nodes.resize(cell_count, SearchNode::default());
        }
        self.nodes.fill(SearchNode::default());
        self.open.clear();
    }

    fn reconstruct(&self, map: &GridMap, end: usize) -> Path {
        let mut path = Path::new();
        let mut current = end;
        while let Some(parent) = self.nodes[current].parent {
            if let Some(col_row) = map.index_to_col_row(current) {
                path.push(col_row);
            }
            current = parent;
        }
        path.reverse();
        path
    }
}

/// East, west, north, south. Row edges never wrap.
fn neighbours(map: &GridMap, index: usize) -> [Option<usize>; 4] {
    let cols = map.cols() as usize;
    let col = index % cols;
    let east = (col + 1 < cols).then(|| index + 1);
    let west = (col > 0).then(|| index - 1);
    let north = index.checked_sub(cols);
    let south = (index + cols < map.cell_count()).then(|| index + cols);
    [east, west, north, south].map(|n| n.filter(|&i| map.is_walkable_index(i)))
}
