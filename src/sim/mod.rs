//! Simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Removals decided by entity ID, applied after each pass
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, is_colliding};
pub use state::{Bullet, Enemy, EnemyBehavior, GameEvent, GameState, Player, Timers};
pub use tick::advance;
