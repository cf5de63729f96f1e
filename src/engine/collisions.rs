use super::*;

use crate::types::GhostStateTag;

impl ChaseEngine {
    pub(super) fn resolve_collisions(&mut self) {
        let Some(player) = self.player else {
            return;
        };
        let scale = self.config.hitbox_scale;

        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if !ghost.mover().aabb().scaled(scale).contains(player.center) {
                continue;
            }
            let kind = ghost.kind();
            match ghost.state_tag() {
                GhostStateTag::Frightened => {
                    if self.ghosts[idx].apply(GhostTrigger::Captured, &self.map) {
                        self.push_event(kind, AgentEvent::Captured);
                    }
                }
                GhostStateTag::Chasing => {
                    self.player_deaths += 1;
                    self.push_event(kind, AgentEvent::PlayerDied);
                    self.stop_all();
                    return;
                }
                _ => {}
            }
        }
    }
}
