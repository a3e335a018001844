//! Simulation core
//!
//! All gameplay logic lives here. The simulation is pure with respect to its
//! collaborators:
//! - Seeded RNG only (one `Pcg32` per world)
//! - Deferred work goes through the frame-clock `Scheduler`
//! - Audio, UI and persistence are requested through `GameEvent`s, never called

pub mod bullet;
pub mod collision;
pub mod director;
pub mod enemy;
pub mod explosive;
pub mod player;
pub mod powerup;
pub mod schedule;
pub mod state;
pub mod terrain;
pub mod tick;

pub use bullet::{Bullet, BulletOwner};
pub use director::{LevelConfig, LevelTable, load_level, start_game};
pub use enemy::{AlertLevel, Enemy, EnemyKind, EnemyStats};
pub use explosive::Explosive;
pub use player::Player;
pub use powerup::{Powerup, PowerupKind};
pub use schedule::{ScheduledEvent, Scheduler, TimerToken};
pub use state::{GameEvent, GamePhase, World};
pub use terrain::{Obstacle, River, Terrain};
pub use tick::{TickInput, tick};
