//! A host entity bound to a pattern subtree

use crate::error::RuntimeResult;
use crate::host::{BulletManager, EmitterId, Entity, Vec2};
use crate::task::{aim_direction, Env, ParamScope, RunStatus, TaskId, TaskTree};
use bml_compiler::ast::{NodeId, NodeKind};
use bml_compiler::Pattern;
use std::sync::Arc;

/// Entity plus the task tree driving it
///
/// The host owns bullets and calls [`Bullet::update`] once per tick.
pub struct Bullet<E: Entity> {
    entity: E,
    pattern: Arc<Pattern>,
    node: NodeId,
    tasks: TaskTree,
    emitter: EmitterId,
}

impl<E: Entity> Bullet<E> {
    /// Bind `entity` to the subtree at `node` and initialise its tasks
    ///
    /// On failure the entity is handed back to the host for removal.
    pub fn bind<M: BulletManager<Entity = E>>(
        entity: E,
        pattern: Arc<Pattern>,
        node: NodeId,
        emitter: EmitterId,
        manager: &mut M,
    ) -> RuntimeResult<Self> {
        Self::bind_with_scope(entity, pattern, node, None, emitter, manager)
    }

    pub(crate) fn bind_with_scope<M: BulletManager<Entity = E>>(
        entity: E,
        pattern: Arc<Pattern>,
        node: NodeId,
        scope: Option<Arc<ParamScope>>,
        emitter: EmitterId,
        manager: &mut M,
    ) -> RuntimeResult<Self> {
        let tasks = match TaskTree::build(&pattern, node, scope, manager) {
            Ok(tasks) => tasks,
            Err(error) => {
                manager.remove_entity(&entity);
                return Err(error);
            }
        };

        let mut bullet = Self {
            entity,
            pattern,
            node,
            tasks,
            emitter,
        };
        bullet.init(manager);

        let Bullet { entity, pattern, .. } = &mut bullet;
        entity.on_spawned(pattern.pattern_name(node));
        Ok(bullet)
    }

    fn init<M: BulletManager<Entity = E>>(&mut self, manager: &mut M) {
        let root = self.tasks.root();
        let mut env = Env {
            pattern: &self.pattern,
            entity: &mut self.entity,
            manager,
            emitter: self.emitter,
        };
        self.tasks.init_task(root, &mut env);
    }

    /// Run the task tree for one tick without moving the entity
    pub fn step<M: BulletManager<Entity = E>>(&mut self, manager: &mut M) -> RunStatus {
        let root = self.tasks.root();
        let mut env = Env {
            pattern: &self.pattern,
            entity: &mut self.entity,
            manager,
            emitter: self.emitter,
        };
        self.tasks.run(root, &mut env)
    }

    /// Run one tick, then integrate position from direction, speed and acceleration
    ///
    /// Tasks keep running after the tree finishes; a finished tree just does
    /// nothing. Removal is the host's call.
    pub fn update<M: BulletManager<Entity = E>>(&mut self, manager: &mut M) -> RunStatus {
        let status = self.step(manager);

        let time_scale = self.entity.time_scale();
        let direction = self.entity.direction();
        let speed = self.entity.speed();
        let acceleration = self.entity.acceleration();
        let scale = self.entity.scale();
        let displacement = Vec2::new(
            acceleration.x + direction.sin() * speed * time_scale,
            acceleration.y - direction.cos() * speed * time_scale,
        );
        let position = self.entity.position();
        self.entity.set_position(Vec2::new(
            position.x + displacement.x * scale,
            position.y + displacement.y * scale,
        ));
        status
    }

    /// Direction from the entity towards the host's aim target
    pub fn aim_direction<M: BulletManager<Entity = E>>(&self, manager: &M) -> f32 {
        aim_direction(self.entity.position(), manager.aim_target(&self.entity))
    }

    pub fn find_task_by_label(&self, label: &str) -> Option<TaskId> {
        self.tasks.find_task_by_label(&self.pattern, label)
    }

    pub fn find_task_by_label_and_name(&self, label: &str, kind: NodeKind) -> Option<TaskId> {
        self.tasks.find_task_by_label_and_name(&self.pattern, label, kind)
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.is_finished()
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// Pattern node the task tree was built from
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn emitter(&self) -> EmitterId {
        self.emitter
    }

    pub fn tasks(&self) -> &TaskTree {
        &self.tasks
    }
}

impl<E: Entity + std::fmt::Debug> std::fmt::Debug for Bullet<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bullet")
            .field("entity", &self.entity)
            .field("node", &self.node)
            .field("tasks", &self.tasks.len())
            .field("emitter", &self.emitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bind_top, close, TestWorld};
    use std::f32::consts::PI;

    #[test]
    fn test_wait_suspends_for_its_duration() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <wait>3</wait>
                   <changeSpeed><speed>2</speed><term>1</term></changeSpeed>
                 </action>
               </bulletml>"#,
        );

        for _ in 0..3 {
            assert_eq!(bullet.step(&mut world), RunStatus::Stop);
            assert_eq!(bullet.entity().speed, 0.0);
        }
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert!(close(bullet.entity().speed, 2.0));
        assert!(bullet.is_finished());
    }

    #[test]
    fn test_wait_follows_time_scale() {
        let source = r#"<bulletml><action label="top"><wait>4</wait></action></bulletml>"#;
        let stops_at = |time_scale: f32| {
            let mut world = TestWorld::new();
            let mut bullet = bind_top(&mut world, source);
            bullet.entity_mut().time_scale = time_scale;
            let mut stops = 0;
            while bullet.step(&mut world) == RunStatus::Stop {
                stops += 1;
            }
            stops
        };

        assert_eq!(stops_at(1.0), 4);
        assert_eq!(stops_at(0.5), 8);
        assert_eq!(stops_at(2.0), 2);
    }

    #[test]
    fn test_speed_change_ends_early_when_time_runs_fast() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <changeSpeed><speed>4</speed><term>4</term></changeSpeed>
                 </action>
               </bulletml>"#,
        );
        bullet.entity_mut().time_scale = 2.0;

        assert_eq!(bullet.step(&mut world), RunStatus::Continue);
        assert!(close(bullet.entity().speed, 1.0));
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert!(close(bullet.entity().speed, 2.0));
    }

    #[test]
    fn test_continuing_children_do_not_block_siblings() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <changeSpeed><speed>3</speed><term>3</term></changeSpeed>
                   <fire><bullet/></fire>
                   <changeDirection>
                     <direction type="sequence">10</direction><term>3</term>
                   </changeDirection>
                 </action>
               </bulletml>"#,
        );

        assert_eq!(bullet.step(&mut world), RunStatus::Continue);
        assert_eq!(world.bullets.len(), 1);
        assert!(close(bullet.entity().speed, 1.0));
        assert!(close(bullet.entity().direction, 10f32.to_radians()));

        assert_eq!(bullet.step(&mut world), RunStatus::Continue);
        assert_eq!(world.bullets.len(), 1);

        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(world.bullets.len(), 1);
        assert!(close(bullet.entity().speed, 3.0));
        assert!(close(bullet.entity().direction, 30f32.to_radians()));
    }

    #[test]
    fn test_repeat_restarts_sequence() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>2</times>
                     <action>
                       <repeat><times>3</times>
                         <action>
                           <fire><direction type="sequence">10</direction><bullet/></fire>
                         </action>
                       </repeat>
                       <wait>1</wait>
                     </action>
                   </repeat>
                 </action>
               </bulletml>"#,
        );

        assert_eq!(bullet.step(&mut world), RunStatus::Stop);
        assert_eq!(world.directions_in_degrees(), vec![0.0, 10.0, 20.0]);
        assert_eq!(bullet.step(&mut world), RunStatus::Stop);
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(
            world.directions_in_degrees(),
            vec![0.0, 10.0, 20.0, 0.0, 10.0, 20.0]
        );
    }

    #[test]
    fn test_absolute_fire_is_constant() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>3</times>
                     <action>
                       <fire>
                         <direction type="absolute">45</direction>
                         <speed>1.5</speed>
                         <bullet/>
                       </fire>
                     </action>
                   </repeat>
                 </action>
               </bulletml>"#,
        );

        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(world.directions_in_degrees(), vec![45.0, 45.0, 45.0]);
        assert!(world.bullets.iter().all(|b| close(b.entity().speed, 1.5)));
    }

    #[test]
    fn test_default_fire_aims_with_firer_speed() {
        let mut world = TestWorld::new();
        world.target = Vec2::new(50.0, 0.0);
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <changeSpeed><speed>3</speed><term>0</term></changeSpeed>
                   <fire><bullet/></fire>
                 </action>
               </bulletml>"#,
        );

        // the speed change ends first, then the fire runs in the same tick
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(world.bullets.len(), 1);
        let shot = world.bullets[0].entity();
        assert!(close(shot.direction, PI / 2.0));
        assert!(close(shot.speed, 3.0));
        assert_eq!(shot.position, Vec2::ZERO);
    }

    #[test]
    fn test_reference_arguments_reach_spawned_bullets() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <actionRef label="shoot"><param>30</param><param>2</param></actionRef>
                 </action>
                 <action label="shoot">
                   <fire>
                     <direction type="absolute">$1 + $3</direction>
                     <speed>$2</speed>
                     <bulletRef label="b"><param>$1 * 2</param></bulletRef>
                   </fire>
                 </action>
                 <bullet label="b">
                   <action>
                     <changeSpeed><speed>$1 + $2</speed><term>1</term></changeSpeed>
                   </action>
                 </bullet>
               </bulletml>"#,
        );

        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(world.directions_in_degrees(), vec![30.0]);
        assert!(close(world.bullets[0].entity().speed, 2.0));

        // $1 comes from the bulletRef, $2 from the actionRef that fired it
        world.tick();
        assert!(close(world.bullets[0].entity().speed, 62.0));
    }

    #[test]
    fn test_sequence_speed_accumulates() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>3</times>
                     <action>
                       <fire>
                         <speed type="sequence">0.5</speed>
                         <bullet><speed>1</speed></bullet>
                       </fire>
                     </action>
                   </repeat>
                 </action>
               </bulletml>"#,
        );

        bullet.step(&mut world);
        let speeds: Vec<f32> = world.bullets.iter().map(|b| b.entity().speed).collect();
        assert_eq!(speeds.len(), 3);
        assert!(close(speeds[0], 1.0));
        assert!(close(speeds[1], 1.5));
        assert!(close(speeds[2], 2.0));
    }

    #[test]
    fn test_update_integrates_position() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(&mut world, r#"<bulletml><action label="top"/></bulletml>"#);
        bullet.entity_mut().direction = PI / 2.0;
        bullet.entity_mut().speed = 2.0;
        bullet.entity_mut().acceleration = Vec2::new(0.0, 1.0);

        bullet.update(&mut world);
        let position = bullet.entity().position;
        assert!(close(position.x, 2.0));
        assert!(close(position.y, 1.0));
    }

    #[test]
    fn test_update_applies_time_scale_and_scale() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(&mut world, r#"<bulletml><action label="top"/></bulletml>"#);
        let entity = bullet.entity_mut();
        entity.direction = PI / 2.0;
        entity.speed = 2.0;
        entity.acceleration = Vec2::new(0.0, 1.0);
        entity.time_scale = 0.5;
        entity.scale = 2.0;

        // (accel + velocity * time_scale) * scale
        bullet.update(&mut world);
        let position = bullet.entity().position;
        assert!(close(position.x, 2.0));
        assert!(close(position.y, 2.0));
    }

    #[test]
    fn test_vanish_removes_entity() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml><action label="top"><wait>1</wait><vanish/></action></bulletml>"#,
        );
        let id = bullet.entity().id;

        bullet.step(&mut world);
        assert!(world.removed.is_empty());
        bullet.step(&mut world);
        assert_eq!(world.removed, vec![id]);
    }

    #[test]
    fn test_refused_and_detached_entities_skip_the_shot() {
        let source = r#"<bulletml><action label="top"><fire><bullet/></fire></action></bulletml>"#;

        let mut world = TestWorld::new();
        world.refuse_creation = true;
        let mut bullet = bind_top(&mut world, source);
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert!(world.bullets.is_empty());

        let mut world = TestWorld::new();
        world.detach_created = true;
        let mut bullet = bind_top(&mut world, source);
        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert!(world.bullets.is_empty());
        assert_eq!(world.created, 1);
        assert_eq!(world.removed.len(), 1);
    }

    #[test]
    fn test_find_tasks_by_label() {
        let mut world = TestWorld::new();
        let bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <actionRef label="burst"/>
                   <fireRef label="shot"/>
                 </action>
                 <action label="burst"><wait>1</wait></action>
                 <fire label="shot"><bullet/></fire>
               </bulletml>"#,
        );

        let tasks = bullet.tasks();
        let action_ref = bullet.pattern().tree().children(bullet.node())[0];

        // the reference carries the label too and is found first
        let by_label = bullet.find_task_by_label("burst").unwrap();
        assert_eq!(tasks.task(by_label).node(), action_ref);

        let action = bullet.find_task_by_label_and_name("burst", NodeKind::Action).unwrap();
        assert_eq!(tasks.task(action).owner(), Some(by_label));
        assert!(bullet.find_task_by_label_and_name("shot", NodeKind::Fire).is_some());
        assert!(bullet.find_task_by_label_and_name("shot", NodeKind::Action).is_none());
        assert!(bullet.find_task_by_label("missing").is_none());
    }

    #[test]
    fn test_spawned_hook_receives_pattern_name() {
        let mut world = TestWorld::new();
        let bullet = bind_top(
            &mut world,
            r#"<bulletml><action label="top" name="spiral"/></bulletml>"#,
        );
        assert_eq!(bullet.entity().spawned_as, Some(Some("spiral".to_string())));
    }

    #[test]
    fn test_random_values_come_from_host() {
        let source = r#"<bulletml>
              <action label="top">
                <repeat><times>4</times>
                  <action>
                    <fire><direction type="absolute">$rand * 360</direction><bullet/></fire>
                  </action>
                </repeat>
              </action>
            </bulletml>"#;

        let run = || {
            let mut world = TestWorld::new();
            let mut bullet = bind_top(&mut world, source);
            bullet.step(&mut world);
            world.directions_in_degrees()
        };
        let first = run();
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|d| (0.0..=360.0).contains(d)));
        assert_eq!(first, run());
    }
}
