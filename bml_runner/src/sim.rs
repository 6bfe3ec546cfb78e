//! In-memory host used by `bml run`
//!
//! Entities are plain structs; bullets live in a vector owned by the host and
//! are stepped once per tick after the emitter. Removal takes effect at the
//! end of the tick in which it was requested.

use bml_compiler::config::runtime::SimulationPreferences;
use bml_compiler::logging::codes;
use bml_compiler::{log_success, Pattern, Randomizer};
use bml_runtime::{Bullet, BulletManager, Emission, Emitter, EmitterId, Entity, RuntimeResult, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

const EMITTER: EmitterId = EmitterId(1);

#[derive(Debug, Clone, Default)]
pub struct SimEntity {
    id: u64,
    position: Vec2,
    direction: f32,
    speed: f32,
    acceleration: Vec2,
    emitter: Option<EmitterId>,
    pattern_name: Option<String>,
}

impl Entity for SimEntity {
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

    fn emitter(&self) -> Option<EmitterId> {
        self.emitter
    }

    fn on_spawned(&mut self, pattern_name: Option<&str>) {
        self.pattern_name = pattern_name.map(str::to_owned);
    }
}

/// Outcome of one simulated run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    pub ticks: u32,
    pub spawned: usize,
    pub removed: usize,
    pub refused: usize,
    pub alive: usize,
    pub peak_alive: usize,
    pub emitter_active: bool,
    /// Spawn count per pattern name; unnamed bullets count under "-"
    pub spawned_by_pattern: BTreeMap<String, usize>,
}

impl SimulationReport {
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "Ticks: {}\nSpawned: {}\nRemoved: {}\nRefused: {}\n",
            self.ticks, self.spawned, self.removed, self.refused
        );
        text.push_str(&format!(
            "Alive: {}\nPeak alive: {}\nEmitter active: {}",
            self.alive, self.peak_alive, self.emitter_active
        ));
        for (name, count) in &self.spawned_by_pattern {
            text.push_str(&format!("\n  spawned {} x{}", name, count));
        }
        text
    }
}

pub struct SimHost {
    next_id: u64,
    target: Vec2,
    rank: f32,
    max_entities: usize,
    randomizer: Randomizer,
    bullets: Vec<Bullet<SimEntity>>,
    /// Bullets taken out of `bullets` while they are stepped
    stepping: usize,
    /// Emitter entity; its removal is picked up by `simulate`
    root: Option<u64>,
    removed: HashSet<u64>,
    report: SimulationReport,
}

impl SimHost {
    pub fn new(preferences: &SimulationPreferences) -> Self {
        let randomizer = match preferences.seed {
            Some(seed) => Randomizer::seeded(seed),
            None => Randomizer::from_entropy(),
        };
        Self {
            next_id: 0,
            target: Vec2::from(preferences.target),
            rank: preferences.rank,
            max_entities: preferences.max_entities,
            randomizer,
            bullets: Vec::new(),
            stepping: 0,
            root: None,
            removed: HashSet::new(),
            report: SimulationReport::default(),
        }
    }

    fn allocate(&mut self, position: Vec2) -> SimEntity {
        self.next_id += 1;
        SimEntity {
            id: self.next_id,
            position,
            emitter: Some(EMITTER),
            ..SimEntity::default()
        }
    }

    /// Live bullets, including those being stepped right now
    fn alive(&self) -> usize {
        self.stepping + self.bullets.len()
    }

    /// Step every live bullet once, then drop the removed ones
    fn tick(&mut self) {
        let mut bullets = std::mem::take(&mut self.bullets);
        self.stepping = bullets.len();
        for bullet in &mut bullets {
            if !self.removed.contains(&bullet.entity().id) {
                bullet.update(self);
            }
        }
        self.stepping = 0;
        bullets.append(&mut self.bullets);
        bullets.retain(|bullet| !self.removed.contains(&bullet.entity().id));
        self.bullets = bullets;

        // every removed bullet is gone now; only a pending root removal stays
        let root = self.root;
        self.removed.retain(|&id| Some(id) == root);
    }

    /// Whether the emitter entity was removed since the last check
    fn take_root_removal(&mut self) -> bool {
        match self.root {
            Some(root) if self.removed.remove(&root) => {
                self.root = None;
                true
            }
            _ => false,
        }
    }
}

impl BulletManager for SimHost {
    type Entity = SimEntity;

    fn create_entity(&mut self, emission: &Emission) -> Option<SimEntity> {
        if self.alive() >= self.max_entities {
            self.report.refused += 1;
            return None;
        }
        let mut entity = self.allocate(emission.position);
        entity.emitter = Some(emission.emitter);
        Some(entity)
    }

    fn spawn(&mut self, bullet: Bullet<SimEntity>) {
        let name = bullet.entity().pattern_name.clone().unwrap_or_else(|| "-".to_string());
        *self.report.spawned_by_pattern.entry(name).or_default() += 1;
        self.report.spawned += 1;
        self.bullets.push(bullet);
    }

    fn remove_entity(&mut self, entity: &SimEntity) {
        if self.removed.insert(entity.id) {
            self.report.removed += 1;
        }
    }

    fn aim_target(&self, _entity: &SimEntity) -> Vec2 {
        self.target
    }

    fn difficulty(&self) -> f32 {
        self.rank
    }

    fn random(&mut self) -> f32 {
        self.randomizer.next_f32()
    }
}

/// Drive `pattern` from a fixed emitter for `preferences.ticks` ticks
pub fn simulate(
    pattern: Arc<Pattern>,
    preferences: &SimulationPreferences,
) -> RuntimeResult<SimulationReport> {
    let mut host = SimHost::new(preferences);
    let origin = Vec2::from(preferences.origin);
    let root = host.allocate(origin);
    host.root = Some(root.id);
    let mut emitter = Emitter::new(EMITTER, root, pattern, &mut host)?;

    for _ in 0..preferences.ticks {
        // a removed entity is never stepped again
        if host.take_root_removal() {
            emitter.detach();
        }
        emitter.update(origin, &mut host);
        host.tick();
        host.report.peak_alive = host.report.peak_alive.max(host.alive());
    }

    if host.take_root_removal() {
        emitter.detach();
    }

    let mut report = std::mem::take(&mut host.report);
    report.ticks = preferences.ticks;
    report.alive = host.alive();
    report.emitter_active = emitter.is_active();

    log_success!(
        codes::success::SIMULATION_COMPLETE,
        "Simulation complete",
        "ticks" => report.ticks,
        "spawned" => report.spawned,
        "alive" => report.alive
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferences(ticks: u32) -> SimulationPreferences {
        SimulationPreferences {
            ticks,
            seed: Some(42),
            rank: 0.5,
            target: [0.0, 200.0],
            origin: [0.0, 0.0],
            max_entities: 100,
        }
    }

    fn load(source: &str) -> Arc<Pattern> {
        Arc::new(bml_compiler::load(source).unwrap())
    }

    #[test]
    fn test_periodic_fire_spawns_each_interval() {
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>999</times>
                     <action>
                       <fire><bulletRef label="shot"/></fire>
                       <wait>9</wait>
                     </action>
                   </repeat>
                 </action>
                 <bullet label="shot" name="shot"><speed>2</speed></bullet>
               </bulletml>"#,
        );

        // shots on ticks 1, 10, 19 and 28
        let report = simulate(pattern, &preferences(30)).unwrap();
        assert_eq!(report.spawned, 4);
        assert_eq!(report.alive, 4);
        assert_eq!(report.spawned_by_pattern.get("shot"), Some(&4));
        assert!(report.emitter_active);
    }

    #[test]
    fn test_vanishing_bullets_are_dropped() {
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <fire><bullet><action><wait>2</wait><vanish/></action></bullet></fire>
                 </action>
               </bulletml>"#,
        );

        let report = simulate(pattern, &preferences(10)).unwrap();
        assert_eq!(report.spawned, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(report.alive, 0);
        assert_eq!(report.peak_alive, 1);
    }

    #[test]
    fn test_entity_cap_refuses_creation() {
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>500</times><action><fire><bullet/></fire></action></repeat>
                 </action>
               </bulletml>"#,
        );

        let report = simulate(pattern, &preferences(1)).unwrap();
        assert_eq!(report.spawned, 100);
        assert_eq!(report.refused, 400);
    }

    #[test]
    fn test_entity_cap_holds_while_bullets_fire() {
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>100</times>
                     <action><fire><bulletRef label="splitter"/></fire></action>
                   </repeat>
                 </action>
                 <bullet label="splitter"><action><fire><bullet/></fire></action></bullet>
               </bulletml>"#,
        );

        let report = simulate(pattern, &preferences(1)).unwrap();
        assert_eq!(report.spawned, 100);
        assert_eq!(report.refused, 100);
        assert_eq!(report.peak_alive, 100);
    }

    #[test]
    fn test_vanished_emitter_is_not_stepped_again() {
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <fire><bullet/></fire>
                   <vanish/>
                   <wait>1</wait>
                   <fire><bullet/></fire>
                 </action>
               </bulletml>"#,
        );

        let report = simulate(pattern, &preferences(5)).unwrap();
        assert_eq!(report.spawned, 1);
        assert_eq!(report.removed, 1);
        assert!(!report.emitter_active);
    }

    #[test]
    fn test_removed_ids_are_pruned() {
        let mut host = SimHost::new(&preferences(0));
        let pattern = load(
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>10</times>
                     <action><fire><bullet><action><vanish/></action></bullet></fire></action>
                   </repeat>
                 </action>
               </bulletml>"#,
        );
        let root = host.allocate(Vec2::ZERO);
        host.root = Some(root.id);
        let mut emitter = Emitter::new(EMITTER, root, pattern, &mut host).unwrap();

        emitter.update(Vec2::ZERO, &mut host);
        host.tick();
        assert_eq!(host.report.removed, 10);
        assert!(host.removed.is_empty());
        assert_eq!(host.alive(), 0);
        assert!(!host.take_root_removal());
    }

    #[test]
    fn test_missing_entry_point_deactivates_emitter() {
        let pattern = load(r#"<bulletml><action label="main"/></bulletml>"#);
        let report = simulate(pattern, &preferences(5)).unwrap();
        assert!(!report.emitter_active);
        assert_eq!(report.removed, 1);
        assert_eq!(report.spawned, 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = SimulationReport {
            ticks: 3,
            spawned: 2,
            ..SimulationReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ticks"], 3);
        assert_eq!(json["spawned"], 2);
        assert!(report.to_text().contains("Spawned: 2"));
    }
}
