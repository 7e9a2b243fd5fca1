//! Fixed timestep simulation step
//!
//! One call to [`advance`] moves the session forward by one frame. Removal
//! decisions are collected by id during read-only passes and applied at the
//! end, so nothing is skipped or processed twice while scanning.

use super::collision::is_colliding;
use super::state::{EnemyBehavior, GameEvent, GameState};
use crate::consts::*;
use crate::enemy_speed;

/// Advance the session by one frame of `dt_ms` milliseconds.
///
/// Order: interval timers, player, bullets, enemies, bullet hits, player hits.
/// Returns the signals raised during the step.
pub fn advance(state: &mut GameState, dt_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.is_over() {
        return events;
    }

    state.time_ticks += 1;

    update_timers(state, dt_ms, &mut events);
    move_player(state);
    move_bullets(state);

    // Enemies that left through the bottom are gone before collisions run
    let mut removed_enemies = move_enemies(state);

    // Bullet vs enemy: each enemy takes at most one bullet, each bullet
    // hits at most one enemy
    let mut spent_bullets: Vec<u32> = Vec::new();
    for enemy in &state.enemies {
        if removed_enemies.contains(&enemy.id) {
            continue;
        }
        let enemy_rect = enemy.rect();
        let hit = state
            .bullets
            .iter()
            .find(|b| !spent_bullets.contains(&b.id) && is_colliding(&b.rect(), &enemy_rect));
        if let Some(bullet) = hit {
            spent_bullets.push(bullet.id);
            removed_enemies.push(enemy.id);
            state.score += KILL_BONUS;
            events.push(GameEvent::Explosion { enemy_id: enemy.id });
        }
    }

    // Player vs enemy: one life per overlapping enemy, until none are left
    let player_rect = state.player.rect();
    for enemy in &state.enemies {
        if removed_enemies.contains(&enemy.id) || !is_colliding(&player_rect, &enemy.rect()) {
            continue;
        }
        removed_enemies.push(enemy.id);
        state.lives -= 1;
        events.push(GameEvent::LifeLost { lives: state.lives });
        if state.lives == 0 {
            log::info!("Session over with score {}", state.score);
            events.push(GameEvent::SessionEnded { score: state.score });
            break;
        }
    }

    // Apply removals, then replenish 1:1
    state.bullets.retain(|b| !spent_bullets.contains(&b.id));
    let before = state.enemies.len();
    state.enemies.retain(|e| !removed_enemies.contains(&e.id));
    let removed = before - state.enemies.len();
    debug_assert_eq!(removed, removed_enemies.len(), "enemy removed twice");
    state.spawn_enemies(removed);

    events
}

/// Accumulate interval timers and fire the ones that are due
fn update_timers(state: &mut GameState, dt_ms: f64, events: &mut Vec<GameEvent>) {
    state.timers.difficulty_ms += dt_ms;
    state.timers.dive_ms += dt_ms;
    state.timers.trivia_ms += dt_ms;

    if interval_elapsed(&mut state.timers.difficulty_ms, DIFFICULTY_INTERVAL_MS) {
        state.danger_level += 1;
        log::info!("Danger level {}", state.danger_level);
        events.push(GameEvent::DangerLevelUp {
            level: state.danger_level,
        });
    }

    if interval_elapsed(&mut state.timers.dive_ms, DIVE_INTERVAL_MS) {
        if let Some(enemy_id) = state.start_dive() {
            events.push(GameEvent::EnemyDiving { enemy_id });
        }
    }

    if interval_elapsed(&mut state.timers.trivia_ms, TRIVIA_INTERVAL_MS) {
        events.push(GameEvent::TriviaDue);
    }
}

/// Consume one interval from `timer` if it is due, keeping the remainder
fn interval_elapsed(timer: &mut f64, interval: f64) -> bool {
    if *timer + TIMER_EPSILON_MS < interval {
        return false;
    }
    *timer -= interval;
    true
}

fn move_player(state: &mut GameState) {
    let player = &mut state.player;
    player.pos += player.vel;
    player.pos.x = player.pos.x.clamp(0.0, state.width - PLAYER_SIZE);
    player.pos.y = player.pos.y.clamp(0.0, state.height - PLAYER_SIZE);
}

fn move_bullets(state: &mut GameState) {
    for bullet in &mut state.bullets {
        bullet.pos.y -= BULLET_SPEED;
    }
    state.bullets.retain(|b| b.pos.y >= 0.0);
}

/// Move every enemy; returns the ids of those that passed the bottom edge
fn move_enemies(state: &mut GameState) -> Vec<u32> {
    let speed = enemy_speed(state.danger_level);
    let (width, height) = (state.width, state.height);
    let mut exited = Vec::new();

    for enemy in &mut state.enemies {
        match enemy.behavior {
            EnemyBehavior::Normal => {
                enemy.pos.x += enemy.direction * speed;
                if enemy.pos.x <= 0.0 || enemy.pos.x + ENEMY_SIZE >= width {
                    enemy.direction = -enemy.direction;
                    enemy.pos.x = enemy.pos.x.clamp(0.0, width - ENEMY_SIZE);
                    enemy.pos.y += ENEMY_DROP;
                }
            }
            EnemyBehavior::Diving => {
                enemy.pos.y += speed * DIVE_SPEED_FACTOR;
            }
        }
        if enemy.pos.y > height {
            exited.push(enemy.id);
        }
    }

    exited
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::sim::state::{Bullet, Enemy};

    fn new_state() -> GameState {
        GameState::new(12345, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0)
    }

    /// A session with no enemies, for hand-placed scenarios
    fn empty_state() -> GameState {
        let mut state = new_state();
        state.enemies.clear();
        state
    }

    fn place_enemy(state: &mut GameState, x: f32, y: f32, behavior: EnemyBehavior) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos: Vec2::new(x, y),
            direction: 1.0,
            behavior,
        });
        id
    }

    fn place_bullet(state: &mut GameState, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos: Vec2::new(x, y),
        });
        id
    }

    #[test]
    fn test_player_is_clamped_to_playfield() {
        let mut state = empty_state();
        state.player.pos = Vec2::new(2.0, 3.0);
        state.player.vel = Vec2::new(-6.0, -6.0);
        advance(&mut state, FRAME_MS);
        assert_eq!(state.player.pos, Vec2::ZERO);

        state.player.pos = Vec2::new(PLAYFIELD_WIDTH - PLAYER_SIZE - 1.0, 530.0);
        state.player.vel = Vec2::new(6.0, 6.0);
        advance(&mut state, FRAME_MS);
        assert_eq!(
            state.player.pos,
            Vec2::new(PLAYFIELD_WIDTH - PLAYER_SIZE, PLAYFIELD_HEIGHT - PLAYER_SIZE)
        );
    }

    #[test]
    fn test_bullet_at_top_is_removed_next_tick() {
        let mut state = empty_state();
        place_bullet(&mut state, 100.0, 0.0);
        advance(&mut state, FRAME_MS);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_moves_up() {
        let mut state = empty_state();
        place_bullet(&mut state, 100.0, 300.0);
        advance(&mut state, FRAME_MS);
        assert_eq!(state.bullets[0].pos.y, 290.0);
    }

    #[test]
    fn test_normal_enemy_bounces_and_drops() {
        let mut state = empty_state();
        let x = PLAYFIELD_WIDTH - ENEMY_SIZE - 1.0;
        place_enemy(&mut state, x, 100.0, EnemyBehavior::Normal);
        advance(&mut state, FRAME_MS);

        let enemy = &state.enemies[0];
        assert_eq!(enemy.direction, -1.0);
        assert_eq!(enemy.pos.y, 130.0);
        assert_eq!(enemy.pos.x, PLAYFIELD_WIDTH - ENEMY_SIZE);

        // Next tick heads back left without another drop
        advance(&mut state, FRAME_MS);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.pos.y, 130.0);
        assert!(enemy.pos.x < PLAYFIELD_WIDTH - ENEMY_SIZE);
    }

    #[test]
    fn test_enemy_speed_scales_with_danger() {
        let mut state = empty_state();
        state.danger_level = 3;
        place_enemy(&mut state, 100.0, 100.0, EnemyBehavior::Normal);
        advance(&mut state, FRAME_MS);
        assert_eq!(state.enemies[0].pos.x, 105.0);
    }

    #[test]
    fn test_diving_enemy_falls_faster() {
        let mut state = empty_state();
        place_enemy(&mut state, 100.0, 100.0, EnemyBehavior::Diving);
        advance(&mut state, FRAME_MS);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.pos.x, 100.0);
        assert_eq!(enemy.pos.y, 106.0);
    }

    #[test]
    fn test_enemy_leaving_bottom_is_replaced() {
        let mut state = empty_state();
        let id = place_enemy(&mut state, 10.0, PLAYFIELD_HEIGHT - 2.0, EnemyBehavior::Diving);
        let events = advance(&mut state, FRAME_MS);
        assert_eq!(state.enemies.len(), 1);
        assert_ne!(state.enemies[0].id, id);
        assert_eq!(state.enemies[0].behavior, EnemyBehavior::Normal);
        assert!(events.is_empty());
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut state = empty_state();
        let enemy_id = place_enemy(&mut state, 200.0, 100.0, EnemyBehavior::Diving);
        // Ends up inside the enemy box after moving 10px up
        place_bullet(&mut state, 220.0, 150.0);

        let events = advance(&mut state, FRAME_MS);
        assert_eq!(events, vec![GameEvent::Explosion { enemy_id }]);
        assert_eq!(state.score, KILL_BONUS);
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies.len(), 1);
        assert_ne!(state.enemies[0].id, enemy_id);
    }

    #[test]
    fn test_one_bullet_kills_one_enemy() {
        let mut state = empty_state();
        place_enemy(&mut state, 200.0, 100.0, EnemyBehavior::Diving);
        place_enemy(&mut state, 210.0, 100.0, EnemyBehavior::Diving);
        place_bullet(&mut state, 230.0, 150.0);

        let events = advance(&mut state, FRAME_MS);
        let explosions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count();
        assert_eq!(explosions, 1);
        assert_eq!(state.score, KILL_BONUS);
        assert_eq!(state.enemies.len(), 2);
    }

    #[test]
    fn test_enemy_exiting_bottom_is_not_also_shot() {
        let mut state = empty_state();
        place_enemy(&mut state, 200.0, PLAYFIELD_HEIGHT - 1.0, EnemyBehavior::Diving);
        place_bullet(&mut state, 220.0, PLAYFIELD_HEIGHT + 10.0);

        let events = advance(&mut state, FRAME_MS);
        assert!(events.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_player_hit_costs_a_life() {
        let mut state = empty_state();
        let (px, py) = (state.player.pos.x, state.player.pos.y);
        place_enemy(&mut state, px, py - 20.0, EnemyBehavior::Diving);

        let events = advance(&mut state, FRAME_MS);
        assert_eq!(events, vec![GameEvent::LifeLost { lives: 2 }]);
        assert_eq!(state.lives, 2);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_several_rams_in_one_tick_cost_several_lives() {
        let mut state = empty_state();
        let (px, py) = (state.player.pos.x, state.player.pos.y);
        place_enemy(&mut state, px, py - 20.0, EnemyBehavior::Diving);
        place_enemy(&mut state, px + 10.0, py - 20.0, EnemyBehavior::Diving);

        advance(&mut state, FRAME_MS);
        assert_eq!(state.lives, 1);
        assert_eq!(state.enemies.len(), 2);
    }

    #[test]
    fn test_last_life_ends_session_once() {
        let mut state = empty_state();
        state.lives = 1;
        let (px, py) = (state.player.pos.x, state.player.pos.y);
        place_enemy(&mut state, px, py - 20.0, EnemyBehavior::Diving);
        place_enemy(&mut state, px + 10.0, py - 20.0, EnemyBehavior::Diving);

        let events = advance(&mut state, FRAME_MS);
        assert_eq!(state.lives, 0);
        let ended = events
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
            .count();
        assert_eq!(ended, 1);

        // A finished session no longer steps
        let ticks = state.time_ticks;
        assert!(advance(&mut state, FRAME_MS).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_danger_level_after_thirty_seconds() {
        let mut state = new_state();
        for _ in 0..29 {
            advance(&mut state, 1000.0);
        }
        assert_eq!(state.danger_level, 1);
        let events = advance(&mut state, 1000.0);
        assert_eq!(state.danger_level, 2);
        assert!(events.contains(&GameEvent::DangerLevelUp { level: 2 }));
    }

    #[test]
    fn test_dive_timer_switches_one_enemy() {
        let mut state = new_state();
        let events = advance(&mut state, DIVE_INTERVAL_MS);
        let divers = state
            .enemies
            .iter()
            .filter(|e| e.behavior == EnemyBehavior::Diving)
            .count();
        assert_eq!(divers, 1);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyDiving { .. }))
        );
    }

    #[test]
    fn test_dive_timer_without_normal_enemies_is_noop() {
        let mut state = empty_state();
        place_enemy(&mut state, 100.0, 100.0, EnemyBehavior::Diving);
        let events = advance(&mut state, DIVE_INTERVAL_MS);
        assert!(events.is_empty());
        assert_eq!(state.timers.dive_ms, 0.0);
    }

    #[test]
    fn test_trivia_due_after_interval() {
        let mut state = empty_state();
        assert!(!advance(&mut state, TRIVIA_INTERVAL_MS - 1.0).contains(&GameEvent::TriviaDue));
        assert!(advance(&mut state, 1.0).contains(&GameEvent::TriviaDue));
        assert_eq!(state.timers.trivia_ms, 0.0);
    }

    #[test]
    fn test_timers_fire_on_exact_frames_at_60hz() {
        let mut state = empty_state();
        let mut danger_at = None;
        let mut trivia_at = None;
        let mut dive_at = None;

        for frame in 1..=2200u32 {
            // One fresh normal enemy keeps the dive timer armed
            state.enemies.clear();
            state.bullets.clear();
            place_enemy(&mut state, 100.0, 100.0, EnemyBehavior::Normal);

            for event in advance(&mut state, FRAME_MS) {
                match event {
                    GameEvent::DangerLevelUp { .. } => {
                        danger_at.get_or_insert(frame);
                    }
                    GameEvent::TriviaDue => {
                        trivia_at.get_or_insert(frame);
                    }
                    GameEvent::EnemyDiving { .. } => {
                        dive_at.get_or_insert(frame);
                    }
                    _ => {}
                }
            }
        }

        assert_eq!(danger_at, Some(1800));
        assert_eq!(trivia_at, Some(2100));
        assert_eq!(dive_at, Some(300));
        assert_eq!(state.danger_level, 2);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        let mut state2 = GameState::new(99999, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);

        for i in 0..600 {
            if i % 7 == 0 {
                state1.fire();
                state2.fire();
            }
            advance(&mut state1, 100.0);
            advance(&mut state2, 100.0);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.lives, state2.lives);
        for (a, b) in state1.enemies.iter().zip(&state2.enemies) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.behavior, b.behavior);
        }
    }

    #[derive(Debug, Clone)]
    enum Step {
        Fire,
        Steer(f32, f32),
        Advance(f64),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Fire),
            (-1i8..=1, -1i8..=1).prop_map(|(x, y)| Step::Steer(x as f32 * 6.0, y as f32 * 6.0)),
            (1.0f64..2000.0).prop_map(Step::Advance),
        ]
    }

    proptest! {
        #[test]
        fn prop_session_invariants(seed in any::<u64>(), steps in prop::collection::vec(step_strategy(), 1..300)) {
            let mut state = GameState::new(seed, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
            let mut ended = 0;

            for step in steps {
                match step {
                    Step::Fire => {
                        state.fire();
                        prop_assert!(state.bullets.len() <= MAX_BULLETS);
                    }
                    Step::Steer(dx, dy) => state.player.vel = Vec2::new(dx, dy),
                    Step::Advance(dt) => {
                        let score = state.score;
                        let danger = state.danger_level;
                        let population = state.enemies.len();
                        let events = advance(&mut state, dt);

                        let kills = events
                            .iter()
                            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
                            .count() as u64;
                        prop_assert_eq!(state.score, score + kills * KILL_BONUS);
                        prop_assert!(state.danger_level >= danger);
                        prop_assert_eq!(state.enemies.len(), population);
                        prop_assert!(state.bullets.len() <= MAX_BULLETS);
                        ended += events
                            .iter()
                            .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
                            .count();
                    }
                }
            }

            prop_assert!(ended <= 1);
            prop_assert_eq!(ended == 1, state.is_over());
        }
    }
}
