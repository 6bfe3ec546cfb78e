//! # Host Capability Contract
//!
//! What the embedding game provides to the interpreter. The interpreter only
//! writes kinematic state through [`Entity`] and only creates, removes or
//! queries the world through [`BulletManager`].

use crate::bullet::Bullet;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// 2D vector in host units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(value: [f32; 2]) -> Self {
        Vec2::new(value[0], value[1])
    }
}

/// Identifies the emitter a family of bullets descends from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmitterId(pub u64);

/// Where and on whose behalf a new entity is requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub emitter: EmitterId,
    pub position: Vec2,
}

/// Kinematic surface of one host entity
///
/// Directions are radians, 0 pointing up and growing clockwise. The
/// interpreter always hands `set_direction` a value in [0, 2π).
pub trait Entity {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);

    fn direction(&self) -> f32;
    fn set_direction(&mut self, direction: f32);

    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);

    fn acceleration(&self) -> Vec2;
    fn set_acceleration(&mut self, acceleration: Vec2);

    /// Multiplier on how fast durations elapse
    fn time_scale(&self) -> f32 {
        1.0
    }

    /// Multiplier on per-tick displacement
    fn scale(&self) -> f32 {
        1.0
    }

    /// Emitter this entity was created for; `None` when detached
    fn emitter(&self) -> Option<EmitterId>;

    /// Called once after the entity's task tree is bound
    fn on_spawned(&mut self, _pattern_name: Option<&str>) {}
}

/// World-side capabilities consumed by the interpreter
pub trait BulletManager {
    type Entity: Entity;

    /// `None` when the world cannot take another entity
    fn create_entity(&mut self, emission: &Emission) -> Option<Self::Entity>;

    /// Take ownership of a freshly bound bullet; the host steps it from now on
    fn spawn(&mut self, bullet: Bullet<Self::Entity>);

    /// Release an entity; calling it twice for the same entity is harmless
    fn remove_entity(&mut self, entity: &Self::Entity);

    /// Point the entity aims at, usually the player
    fn aim_target(&self, entity: &Self::Entity) -> Vec2;

    /// Value of `$rank`
    fn difficulty(&self) -> f32;

    /// Value of `$rand`, uniform in [0, 1)
    fn random(&mut self) -> f32;
}
