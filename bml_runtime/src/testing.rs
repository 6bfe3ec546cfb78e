//! Deterministic in-memory host for unit tests

use crate::bullet::Bullet;
use crate::host::{BulletManager, Emission, EmitterId, Entity, Vec2};
use bml_compiler::Pattern;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub const EMITTER: EmitterId = EmitterId(7);

#[derive(Debug, Clone)]
pub struct TestEntity {
    pub id: u64,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
    pub acceleration: Vec2,
    pub time_scale: f32,
    pub scale: f32,
    pub emitter: Option<EmitterId>,
    pub spawned_as: Option<Option<String>>,
}

impl Default for TestEntity {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            direction: 0.0,
            speed: 0.0,
            acceleration: Vec2::ZERO,
            time_scale: 1.0,
            scale: 1.0,
            emitter: None,
            spawned_as: None,
        }
    }
}

impl Entity for TestEntity {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn direction(&self) -> f32 {
        self.direction
    }

    fn set_direction(&mut self, direction: f32) {
        self.direction = direction;
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    fn set_acceleration(&mut self, acceleration: Vec2) {
        self.acceleration = acceleration;
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn emitter(&self) -> Option<EmitterId> {
        self.emitter
    }

    fn on_spawned(&mut self, pattern_name: Option<&str>) {
        self.spawned_as = Some(pattern_name.map(str::to_owned));
    }
}

pub struct TestWorld {
    pub next_id: u64,
    pub target: Vec2,
    pub rank: f32,
    pub bullets: Vec<Bullet<TestEntity>>,
    pub removed: Vec<u64>,
    pub created: usize,
    pub refuse_creation: bool,
    pub detach_created: bool,
    rng: StdRng,
}

impl TestWorld {
    /// World whose aim target sits straight above the origin
    pub fn new() -> Self {
        Self {
            next_id: 0,
            target: Vec2::new(0.0, -100.0),
            rank: 0.0,
            bullets: Vec::new(),
            removed: Vec::new(),
            created: 0,
            refuse_creation: false,
            detach_created: false,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }

    /// Emitter entity at `position`
    pub fn root_entity(&mut self, position: Vec2) -> TestEntity {
        self.next_id += 1;
        TestEntity {
            id: self.next_id,
            position,
            emitter: Some(EMITTER),
            ..TestEntity::default()
        }
    }

    /// Advance every spawned bullet by one tick
    pub fn tick(&mut self) {
        let mut bullets = std::mem::take(&mut self.bullets);
        for bullet in &mut bullets {
            bullet.update(self);
        }
        bullets.append(&mut self.bullets);
        self.bullets = bullets;
    }

    pub fn directions_in_degrees(&self) -> Vec<f32> {
        self.bullets
            .iter()
            .map(|bullet| bullet.entity().direction.to_degrees().round())
            .collect()
    }
}

impl BulletManager for TestWorld {
    type Entity = TestEntity;

    fn create_entity(&mut self, emission: &Emission) -> Option<TestEntity> {
        if self.refuse_creation {
            return None;
        }
        self.next_id += 1;
        self.created += 1;
        Some(TestEntity {
            id: self.next_id,
            position: emission.position,
            emitter: (!self.detach_created).then_some(emission.emitter),
            ..TestEntity::default()
        })
    }

    fn spawn(&mut self, bullet: Bullet<TestEntity>) {
        self.bullets.push(bullet);
    }

    fn remove_entity(&mut self, entity: &TestEntity) {
        if !self.removed.contains(&entity.id) {
            self.removed.push(entity.id);
        }
    }

    fn aim_target(&self, _entity: &TestEntity) -> Vec2 {
        self.target
    }

    fn difficulty(&self) -> f32 {
        self.rank
    }

    fn random(&mut self) -> f32 {
        self.rng.gen()
    }
}

pub fn pattern(source: &str) -> Arc<Pattern> {
    Arc::new(bml_compiler::load(source).expect("test pattern should load"))
}

/// Bind a fresh root entity at the origin to the pattern's first entry point
pub fn bind_top(world: &mut TestWorld, source: &str) -> Bullet<TestEntity> {
    let pattern = pattern(source);
    let entry = pattern.entry_points()[0];
    let entity = world.root_entity(Vec2::ZERO);
    Bullet::bind(entity, pattern, entry, EMITTER, world).expect("test pattern should bind")
}

pub fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
