//! # Task Interpreter
//!
//! Each bound entity owns a [`TaskTree`]: an arena of tasks mirroring the
//! executable part of its pattern subtree, with references expanded in place.
//! Composite tasks run their unfinished children in order; leaf tasks drive
//! the entity's kinematic state through the host contract.
//!
//! A tick returns a [`RunStatus`]:
//! - `Continue`: not finished, keep going this tick
//! - `Stop`: suspended until the next tick (a wait is pending)
//! - `End`: finished

mod build;
mod fire;
mod kinematics;
mod run;
mod scope;
mod setup;

pub use kinematics::{aim_direction, normalize_direction, wrap_angle};
pub use scope::ParamScope;

pub(crate) use fire::FireState;
pub(crate) use kinematics::{AccelChange, DirectionChange, SpeedChange};

use crate::host::{BulletManager, EmitterId, Entity};
use bml_compiler::ast::{NodeId, NodeKind};
use bml_compiler::Pattern;
use std::sync::Arc;

/// Index of a task inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Continue,
    End,
    Stop,
}

#[derive(Debug, Clone)]
pub(crate) enum TaskState {
    /// Runs children in order; bullet roots and fire holders
    Composite,
    /// Like `Composite`, but re-initialising it hard resets the subtree
    Repeat,
    Action { repeat_max: i64, repeat_num: i64 },
    Wait { remaining: f32 },
    ChangeDirection(DirectionChange),
    ChangeSpeed(SpeedChange),
    Accel(AccelChange),
    Fire(Box<FireState>),
    Vanish,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub(crate) node: NodeId,
    pub(crate) owner: Option<TaskId>,
    pub(crate) children: Vec<TaskId>,
    pub(crate) params: Vec<f32>,
    pub(crate) finished: bool,
    pub(crate) state: TaskState,
}

impl Task {
    /// Pattern node this task executes
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Task that created this one
    pub fn owner(&self) -> Option<TaskId> {
        self.owner
    }

    pub fn children(&self) -> &[TaskId] {
        &self.children
    }

    /// Arguments bound by the reference this task was expanded from
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fires performed since the last hard reset; 0 for other tasks
    pub fn times_fired(&self) -> u32 {
        match &self.state {
            TaskState::Fire(fire) => fire.times_fired,
            _ => 0,
        }
    }
}

/// Task arena for one entity
#[derive(Debug, Clone)]
pub struct TaskTree {
    tasks: Vec<Task>,
    root: TaskId,
    scope: Option<Arc<ParamScope>>,
}

impl TaskTree {
    pub fn root(&self) -> TaskId {
        self.root
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Arguments inherited from the fire that spawned this tree
    pub fn scope(&self) -> Option<&Arc<ParamScope>> {
        self.scope.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.tasks[self.root.0].finished
    }

    /// Value of `$index` as seen from `task`
    ///
    /// Walks the owner chain; the first task whose argument list is long
    /// enough answers. Past the root, the inherited scope answers.
    pub fn param(&self, task: TaskId, index: usize) -> Option<f32> {
        let slot = index.checked_sub(1)?;
        let mut current = Some(task);
        while let Some(id) = current {
            let task = &self.tasks[id.0];
            if let Some(value) = task.params.get(slot) {
                return Some(*value);
            }
            current = task.owner;
        }
        self.scope.as_ref().and_then(|scope| scope.param(index))
    }

    /// First task, depth first, whose node carries `label`
    pub fn find_task_by_label(&self, pattern: &Pattern, label: &str) -> Option<TaskId> {
        self.find_task(self.root, &|task| pattern.tree().node(task.node).has_label(label))
    }

    /// Like [`Self::find_task_by_label`], restricted to nodes of `kind`
    pub fn find_task_by_label_and_name(
        &self,
        pattern: &Pattern,
        label: &str,
        kind: NodeKind,
    ) -> Option<TaskId> {
        self.find_task(self.root, &|task| {
            let node = pattern.tree().node(task.node);
            node.kind == kind && node.has_label(label)
        })
    }

    fn find_task(&self, start: TaskId, matches: &dyn Fn(&Task) -> bool) -> Option<TaskId> {
        let task = &self.tasks[start.0];
        if matches(task) {
            return Some(start);
        }
        task.children
            .iter()
            .find_map(|&child| self.find_task(child, matches))
    }

    /// Argument frames visible from `task`, for a tree it spawns
    pub(crate) fn capture_scope(&self, task: TaskId) -> Arc<ParamScope> {
        let mut frames = Vec::new();
        let mut current = Some(task);
        while let Some(id) = current {
            let task = &self.tasks[id.0];
            if !task.params.is_empty() {
                frames.push(task.params.clone());
            }
            current = task.owner;
        }
        Arc::new(ParamScope::new(frames, self.scope.as_deref()))
    }
}

/// Everything a task touches while it is set up or run
pub(crate) struct Env<'a, M: BulletManager> {
    pub pattern: &'a Arc<Pattern>,
    pub entity: &'a mut M::Entity,
    pub manager: &'a mut M,
    pub emitter: EmitterId,
}

impl<M: BulletManager> Env<'_, M> {
    /// Direction from the entity towards the host's aim target
    pub fn aim(&self) -> f32 {
        let target = self.manager.aim_target(&*self.entity);
        aim_direction(self.entity.position(), target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bind_top, pattern, TestWorld, EMITTER};
    use crate::{Bullet, RuntimeError, Vec2};
    use assert_matches::assert_matches;

    #[test]
    fn test_reference_expansion_layout() {
        let mut world = TestWorld::new();
        let bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <actionRef label="inner"><param>4</param><param>$rank</param></actionRef>
                 </action>
                 <action label="inner"><wait>$1</wait></action>
               </bulletml>"#,
        );

        let tasks = bullet.tasks();
        let root = tasks.task(tasks.root());
        assert_eq!(root.children().len(), 1);

        let action_ref = tasks.task(root.children()[0]);
        assert_eq!(action_ref.params(), &[4.0, 0.0]);
        assert_eq!(action_ref.children().len(), 1);

        let inner = action_ref.children()[0];
        let wait = tasks.task(inner).children()[0];
        assert_eq!(tasks.param(wait, 1), Some(4.0));
        assert_eq!(tasks.param(wait, 3), None);
        assert_eq!(tasks.len(), 4);
    }

    #[test]
    fn test_repeat_count_truncates() {
        let mut world = TestWorld::new();
        world.rank = 0.9;
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <repeat><times>2 + $rank</times>
                     <action><fire><bullet/></fire></action>
                   </repeat>
                 </action>
               </bulletml>"#,
        );

        assert_eq!(bullet.step(&mut world), RunStatus::End);
        assert_eq!(world.bullets.len(), 2);
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let mut world = TestWorld::new();
        let looping = pattern(
            r#"<bulletml>
                 <action label="top"><actionRef label="top"/></action>
               </bulletml>"#,
        );
        let entity = world.root_entity(Vec2::ZERO);
        let id = entity.id;
        let entry = looping.entry_points()[0];

        let error = Bullet::bind(entity, looping, entry, EMITTER, &mut world).unwrap_err();
        assert_matches!(error, RuntimeError::ReferenceDepthExceeded { .. });
        assert_eq!(world.removed, vec![id]);
    }

    #[test]
    fn test_fire_counts_shots() {
        let mut world = TestWorld::new();
        let mut bullet = bind_top(
            &mut world,
            r#"<bulletml>
                 <action label="top">
                   <fire label="shot"><bullet/></fire>
                   <fire><bullet/></fire>
                 </action>
               </bulletml>"#,
        );

        bullet.step(&mut world);
        let shot = bullet.find_task_by_label("shot").unwrap();
        assert_eq!(bullet.tasks().task(shot).times_fired(), 1);
        assert!(bullet.tasks().task(shot).is_finished());
        assert!(bullet.tasks().is_finished());
    }
}
