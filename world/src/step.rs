//! One-tick transition function.

use bboard_core::{AgentId, Cell, Direction, Move, Position, PowerUp, AGENT_COUNT};

use crate::State;

/// Advances `state` by a single tick, applying one move per agent.
///
/// `moves` is ordered by agent id. Within the tick the phases run in a fixed
/// order:
///
/// 1. every bomb fuse burns one tick and expired bombs detonate, chaining into
///    any bomb their rays reach;
/// 2. living agents act by ascending id against the live grid, so the lower id
///    wins a contested tile;
/// 3. flames from earlier ticks age and expired ones clear;
/// 4. agents standing in fire are eliminated together;
/// 5. survivors receive the pick-ups they walked onto;
/// 6. the tick counter advances.
pub fn step(state: &mut State, moves: &[Move; AGENT_COUNT]) {
    let aging = state.flames.len();

    for index in 0..state.bombs.len() {
        state.bombs[index].tick_fuse();
    }
    state.explode_expired_bombs();

    let pickups = resolve_moves(state, moves);

    for index in 0..aging {
        let flame = &mut state.flames[index];
        flame.time_left = flame.time_left.saturating_sub(1);
    }
    while state.flames.front().is_some_and(|flame| flame.time_left == 0) {
        state.pop_flame();
    }

    let mut victims = [AgentId::ALL[0]; AGENT_COUNT];
    let mut count = 0;
    for agent in AgentId::ALL {
        let info = state.agent(agent);
        if !info.dead && state[info.position].is_flame() {
            victims[count] = agent;
            count += 1;
        }
    }
    state.kill_all(&victims[..count]);

    for agent in AgentId::ALL {
        if let Some(power_up) = pickups[agent.index()] {
            let info = state.agent_mut(agent);
            if !info.dead {
                info.collect(power_up);
            }
        }
    }

    state.time_step += 1;
}

fn resolve_moves(state: &mut State, moves: &[Move; AGENT_COUNT]) -> [Option<PowerUp>; AGENT_COUNT] {
    let mut pickups = [None; AGENT_COUNT];

    for agent in AgentId::ALL {
        let info = *state.agent(agent);
        // engulfed agents are eliminated later in the tick
        if info.dead || state[info.position].is_flame() {
            continue;
        }

        let action = moves[agent.index()];
        if action == Move::Bomb {
            state.plant_bomb(info.position, agent, false);
            continue;
        }
        let Some(direction) = action.direction() else {
            continue;
        };

        let Some(target) = info.position.step(direction) else {
            continue;
        };

        match state[target] {
            Cell::Passage => {}
            Cell::PowerUp(power_up) => pickups[agent.index()] = Some(power_up),
            Cell::Bomb if info.can_kick => {
                if !kick(state, target, direction) {
                    continue;
                }
            }
            _ => continue,
        }
        state.put_agent(target, agent);
    }

    pickups
}

/// Slides the bomb lying at `from` along passage tiles until it is blocked.
fn kick(state: &mut State, from: Position, direction: Direction) -> bool {
    let Some(index) = state.bomb_index_at(from) else {
        return false;
    };

    let mut target = from;
    while let Some(next) = target.step(direction) {
        if state[next] != Cell::Passage {
            break;
        }
        target = next;
    }
    if target == from {
        return false;
    }

    state.bombs[index].set_position(target);
    state[from] = Cell::Passage;
    state[target] = Cell::Bomb;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const A0: AgentId = AgentId::new(0);
    const A1: AgentId = AgentId::new(1);

    const IDLE: [Move; AGENT_COUNT] = [Move::Idle; AGENT_COUNT];

    fn moves_for(agent: AgentId, action: Move) -> [Move; AGENT_COUNT] {
        let mut moves = IDLE;
        moves[agent.index()] = action;
        moves
    }

    #[test]
    fn idle_tick_only_advances_the_counter() {
        let mut state = State::new();
        let [a0, a1, a2, a3] = AgentId::ALL;
        state.put_agents_in_corners(a0, a1, a2, a3);
        let before = state.clone();

        step(&mut state, &IDLE);

        assert_eq!(state.time_step(), 1);
        assert_eq!(state.board(), before.board());
        assert_eq!(state.agents(), before.agents());
    }

    #[test]
    fn agent_cannot_leave_the_board_or_enter_obstacles() {
        let mut state = State::new();
        state.put_agent(Position::new(0, 0), A0);
        state.put_item(Position::new(1, 0), Cell::Wood(None));

        step(&mut state, &moves_for(A0, Move::Up));
        step(&mut state, &moves_for(A0, Move::Left));
        step(&mut state, &moves_for(A0, Move::Right));

        assert_eq!(state.agent(A0).position, Position::new(0, 0));
        assert_eq!(state[Position::new(1, 0)], Cell::Wood(None));
    }

    #[test]
    fn planted_bomb_appears_once_the_agent_walks_away() {
        let mut state = State::new();
        state.put_agent(Position::new(3, 3), A1);

        step(&mut state, &moves_for(A1, Move::Bomb));
        assert_eq!(state[Position::new(3, 3)], Cell::Agent(A1));
        assert_eq!(state.agent(A1).bomb_count, 1);

        step(&mut state, &moves_for(A1, Move::Down));
        assert_eq!(state[Position::new(3, 3)], Cell::Bomb);
        assert_eq!(state[Position::new(3, 4)], Cell::Agent(A1));
        assert_eq!(state.bombs()[0].fuse(), bboard_core::BOMB_LIFETIME - 1);
    }

    #[test]
    fn agents_cannot_walk_onto_bombs_without_kick() {
        let mut state = State::new();
        state.put_agent(Position::new(4, 4), A0);
        state.plant_bomb(Position::new(5, 4), A1, true);

        step(&mut state, &moves_for(A0, Move::Right));

        assert_eq!(state.agent(A0).position, Position::new(4, 4));
        assert_eq!(state[Position::new(5, 4)], Cell::Bomb);
    }

    #[test]
    fn blocked_kick_leaves_agent_in_place() {
        let mut state = State::new();
        state.put_agent(Position::new(8, 4), A0);
        state.agent_mut(A0).can_kick = true;
        state.plant_bomb(Position::new(9, 4), A1, true);
        state.put_item(Position::new(10, 4), Cell::Rigid);

        step(&mut state, &moves_for(A0, Move::Right));

        assert_eq!(state.agent(A0).position, Position::new(8, 4));
        assert_eq!(state.bombs()[0].position(), Position::new(9, 4));
    }
}
