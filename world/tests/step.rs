use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use bboard_core::{AgentId, Cell, Move, Position, PowerUp, AGENT_COUNT, BOMB_LIFETIME, FLAME_LIFETIME};
use bboard_world::{step, State};

const A0: AgentId = AgentId::new(0);
const A1: AgentId = AgentId::new(1);
const A2: AgentId = AgentId::new(2);
const A3: AgentId = AgentId::new(3);

const IDLE: [Move; AGENT_COUNT] = [Move::Idle; AGENT_COUNT];

fn pos(x: u8, y: u8) -> Position {
    Position::new(x, y)
}

fn only(agent: AgentId, action: Move) -> [Move; AGENT_COUNT] {
    let mut moves = IDLE;
    moves[agent.index()] = action;
    moves
}

fn burning(state: &State) -> Vec<Position> {
    Position::all().filter(|p| state[*p].is_flame()).collect()
}

fn row_major(mut positions: Vec<Position>) -> Vec<Position> {
    positions.sort_by_key(|p| (p.y(), p.x()));
    positions
}

fn line_up() -> State {
    let mut state = State::new();
    state.put_agent(pos(5, 5), A0);
    state.put_agent(pos(6, 5), A1);
    state.put_agent(pos(8, 5), A2);
    state.put_agent(pos(0, 0), A3);
    state.agent_mut(A0).bomb_strength = 2;
    state
}

fn walk_away_script() -> Vec<[Move; AGENT_COUNT]> {
    let mut script = vec![
        only(A0, Move::Bomb),
        only(A0, Move::Up),
        only(A0, Move::Up),
        only(A0, Move::Up),
        only(A0, Move::Left),
    ];
    script.resize(BOMB_LIFETIME as usize + 1, IDLE);
    script
}

#[test]
fn bomb_detonates_after_its_fuse_and_kills_agents_in_reach() {
    let mut state = line_up();
    let script = walk_away_script();
    let (last, rest) = script.split_last().expect("script is not empty");

    for moves in rest {
        step(&mut state, moves);
    }
    assert!(burning(&state).is_empty(), "bomb went off early");
    assert_eq!(state.bombs().len(), 1);
    assert_eq!(state.bombs()[0].fuse(), 1);
    assert_eq!(state[pos(5, 5)], Cell::Bomb);

    step(&mut state, last);

    let expected = row_major(vec![
        pos(5, 5),
        pos(5, 4),
        pos(5, 3),
        pos(5, 6),
        pos(5, 7),
        pos(4, 5),
        pos(3, 5),
        pos(6, 5),
        pos(7, 5),
    ]);
    assert_eq!(burning(&state), expected);
    assert_eq!(state.time_step(), BOMB_LIFETIME + 1);
    assert!(state.bombs().is_empty());
    assert_eq!(state.agent(A0).bomb_count, 0);

    assert_eq!(state.agent(A0).position, pos(4, 2));
    assert!(!state.agent(A0).dead);
    assert!(state.agent(A1).dead);
    assert!(!state.agent(A2).dead);
    assert!(!state.agent(A3).dead);
    assert_eq!(state.alive_agents(), 3);
    assert_eq!(state[pos(8, 5)], Cell::Agent(A2));
}

#[test]
fn flames_clear_exactly_after_their_lifetime() {
    let mut state = line_up();
    for moves in walk_away_script() {
        step(&mut state, &moves);
    }
    assert!(!burning(&state).is_empty());

    for _ in 0..FLAME_LIFETIME - 1 {
        step(&mut state, &IDLE);
        assert_eq!(state.flames().len(), 1);
    }
    step(&mut state, &IDLE);

    assert!(burning(&state).is_empty());
    assert!(state.flames().is_empty());
    assert_eq!(state[pos(6, 5)], Cell::Passage, "dead agent leaves no marker");
}

#[test]
fn agent_caught_in_a_blast_cannot_escape() {
    let mut state = State::new();
    state.put_agent(pos(5, 5), A0);

    step(&mut state, &only(A0, Move::Bomb));
    for _ in 1..BOMB_LIFETIME {
        step(&mut state, &IDLE);
    }
    step(&mut state, &only(A0, Move::Up));

    assert!(state.agent(A0).dead);
    assert_eq!(state.agent(A0).position, pos(5, 5));
    assert!(state[pos(5, 4)].is_flame());
    assert_eq!(state.alive_agents(), AGENT_COUNT - 1);
}

#[test]
fn detonation_chains_through_bombs_in_reach() {
    let mut state = State::new();
    state.put_agent(pos(10, 10), A3);
    state.plant_bomb(pos(2, 2), A0, true);
    for _ in 0..3 {
        step(&mut state, &IDLE);
    }
    state.plant_bomb(pos(3, 2), A1, true);
    state.plant_bomb(pos(3, 6), A2, true);

    for _ in 3..BOMB_LIFETIME {
        step(&mut state, &IDLE);
    }

    assert_eq!(state.bombs().len(), 1, "only the out-of-reach bomb remains");
    assert_eq!(state.bombs()[0].position(), pos(3, 6));
    assert_eq!(state.flames().len(), 2);
    assert!(state[pos(4, 2)].is_flame());
    assert!(state[pos(3, 3)].is_flame());
    assert_eq!(state.agent(A1).bomb_count, 0);
    assert_eq!(state.agent(A2).bomb_count, 1);
}

#[test]
fn simultaneous_detonations_are_laid_one_after_another() {
    let mut state = State::new();
    state.put_agent(pos(10, 10), A3);
    state.put_item(pos(4, 5), Cell::Wood(None));
    state.put_item(pos(5, 5), Cell::Wood(None));
    state.agent_mut(A0).bomb_strength = 4;
    state.agent_mut(A1).bomb_strength = 2;
    state.plant_bomb(pos(1, 5), A0, true);
    state.plant_bomb(pos(2, 5), A1, true);

    for _ in 0..BOMB_LIFETIME {
        step(&mut state, &IDLE);
    }

    assert!(state.bombs().is_empty());
    assert_eq!(state.flames().len(), 2);
    assert!(state[pos(4, 5)].is_flame());
    assert_eq!(state[pos(5, 5)], Cell::Wood(None));
}

#[test]
fn rays_stop_before_rigid_and_on_wood() {
    let mut state = State::new();
    state.put_agent(pos(10, 10), A3);
    state.put_item(pos(4, 5), Cell::Rigid);
    state.put_item(pos(6, 5), Cell::Wood(None));
    state.put_item(pos(7, 5), Cell::Wood(None));
    state.agent_mut(A0).bomb_strength = 3;
    state.plant_bomb(pos(5, 5), A0, true);

    for _ in 0..BOMB_LIFETIME {
        step(&mut state, &IDLE);
    }

    assert_eq!(state[pos(4, 5)], Cell::Rigid);
    assert_eq!(state[pos(3, 5)], Cell::Passage);
    assert!(state[pos(6, 5)].is_flame());
    assert_eq!(state[pos(7, 5)], Cell::Wood(None));

    for _ in 0..FLAME_LIFETIME {
        step(&mut state, &IDLE);
    }
    assert_eq!(state[pos(6, 5)], Cell::Passage);
}

#[test]
fn hidden_pick_up_appears_only_after_fire_clears() {
    let mut state = State::new();
    state.put_agent(pos(10, 10), A3);
    state.put_item(pos(5, 4), Cell::Wood(Some(PowerUp::Kick)));
    state.plant_bomb(pos(5, 5), A0, true);

    for _ in 0..BOMB_LIFETIME {
        step(&mut state, &IDLE);
    }
    assert!(state[pos(5, 4)].is_flame());

    for _ in 0..FLAME_LIFETIME - 1 {
        step(&mut state, &IDLE);
        assert!(state[pos(5, 4)].is_flame());
    }
    step(&mut state, &IDLE);

    assert_eq!(state[pos(5, 4)], Cell::PowerUp(PowerUp::Kick));
}

#[test]
fn lower_agent_id_wins_contested_tile() {
    let mut state = State::new();
    state.put_agent(pos(4, 5), A0);
    state.put_agent(pos(6, 5), A1);
    let mut moves = IDLE;
    moves[A0.index()] = Move::Right;
    moves[A1.index()] = Move::Left;

    let mut replay = state.clone();
    step(&mut state, &moves);
    step(&mut replay, &moves);

    assert_eq!(state.agent(A0).position, pos(5, 5));
    assert_eq!(state.agent(A1).position, pos(6, 5));
    assert_eq!(state[pos(5, 5)], Cell::Agent(A0));
    assert_eq!(state[pos(4, 5)], Cell::Passage);
    assert_eq!(state, replay);
}

#[test]
fn agent_may_follow_into_a_tile_vacated_earlier_in_the_tick() {
    let mut state = State::new();
    state.put_agent(pos(3, 3), A0);
    state.put_agent(pos(2, 3), A1);
    let mut moves = IDLE;
    moves[A0.index()] = Move::Right;
    moves[A1.index()] = Move::Right;

    step(&mut state, &moves);

    assert_eq!(state.agent(A0).position, pos(4, 3));
    assert_eq!(state.agent(A1).position, pos(3, 3));
}

#[test]
fn agent_cannot_follow_a_higher_id_that_has_not_moved_yet() {
    let mut state = State::new();
    state.put_agent(pos(3, 3), A0);
    state.put_agent(pos(4, 3), A1);
    let mut moves = IDLE;
    moves[A0.index()] = Move::Right;
    moves[A1.index()] = Move::Right;

    step(&mut state, &moves);

    assert_eq!(state.agent(A0).position, pos(3, 3));
    assert_eq!(state.agent(A1).position, pos(5, 3));
}

#[test]
fn kicked_bomb_slides_until_blocked() {
    let mut state = State::new();
    state.put_agent(pos(2, 2), A0);
    state.agent_mut(A0).can_kick = true;
    state.plant_bomb(pos(3, 2), A1, true);
    state.put_item(pos(8, 2), Cell::Wood(None));

    step(&mut state, &only(A0, Move::Right));

    assert_eq!(state.agent(A0).position, pos(3, 2));
    assert_eq!(state[pos(3, 2)], Cell::Agent(A0));
    assert_eq!(state.bombs()[0].position(), pos(7, 2));
    assert_eq!(state[pos(7, 2)], Cell::Bomb);
    assert_eq!(state[pos(2, 2)], Cell::Passage);
}

#[test]
fn walking_onto_pick_ups_upgrades_the_agent() {
    let mut state = State::new();
    state.put_agent(pos(1, 0), A0);
    state.put_item(pos(1, 1), Cell::PowerUp(PowerUp::ExtraBomb));
    state.put_item(pos(1, 2), Cell::PowerUp(PowerUp::IncreaseRange));
    state.put_item(pos(1, 3), Cell::PowerUp(PowerUp::Kick));

    for _ in 0..3 {
        step(&mut state, &only(A0, Move::Down));
    }

    let info = state.agent(A0);
    assert_eq!(info.position, pos(1, 3));
    assert_eq!(info.max_bomb_count, 2);
    assert_eq!(info.bomb_strength, 2);
    assert!(info.can_kick);
    assert_eq!(state[pos(1, 1)], Cell::Passage);
}

#[test]
fn dead_agents_ignore_their_moves() {
    let mut state = State::new();
    state.put_agent(pos(4, 4), A2);
    state.kill(A2);

    step(&mut state, &only(A2, Move::Bomb));
    step(&mut state, &only(A2, Move::Left));

    assert!(state.bombs().is_empty());
    assert_eq!(state.agent(A2).position, pos(4, 4));
    assert_eq!(state.alive_agents(), AGENT_COUNT - 1);
}

#[test]
fn deterministic_replay_produces_identical_states() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

fn replay() -> State {
    let mut state = line_up();
    state.put_item(pos(5, 1), Cell::Wood(Some(PowerUp::ExtraBomb)));
    state.put_item(pos(2, 5), Cell::Rigid);
    let mut script = walk_away_script();
    script.extend(std::iter::repeat(only(A2, Move::Bomb)).take(2));
    script.extend(std::iter::repeat(only(A2, Move::Right)).take(2));
    script.resize(40, IDLE);

    for moves in &script {
        step(&mut state, moves);
    }
    state
}

fn fingerprint(state: &State) -> u64 {
    let mut hasher = DefaultHasher::new();
    for position in Position::all() {
        state[position].encode().hash(&mut hasher);
    }
    for bomb in state.bombs().iter() {
        bomb.raw().hash(&mut hasher);
    }
    for info in state.agents() {
        (info.position, info.bomb_count, info.dead).hash(&mut hasher);
    }
    state.time_step().hash(&mut hasher);
    hasher.finish()
}
