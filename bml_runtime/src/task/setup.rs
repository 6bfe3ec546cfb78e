//! Task initialisation
//!
//! `init_task` prepares a task for (re)execution. A repeat re-initialised by
//! its enclosing action is hard reset instead, which also clears the fire
//! counters below it so sequence values restart.

use super::scope::EvalScope;
use super::{AccelChange, DirectionChange, Env, SpeedChange, TaskId, TaskState, TaskTree};
use crate::host::{BulletManager, Entity};
use bml_compiler::ast::{NodeId, NodeKind, NodeType};
use bml_compiler::Pattern;

impl TaskTree {
    pub(crate) fn init_task<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) {
        if matches!(self.tasks[id.0].state, TaskState::Repeat) {
            self.hard_reset(id, env);
            return;
        }

        self.tasks[id.0].finished = false;
        for index in 0..self.tasks[id.0].children.len() {
            let child = self.tasks[id.0].children[index];
            self.init_task(child, env);
        }
        self.setup(id, env);
    }

    pub(crate) fn hard_reset<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) {
        let task = &mut self.tasks[id.0];
        task.finished = false;
        if let TaskState::Fire(fire) = &mut task.state {
            fire.times_fired = 0;
        }

        for index in 0..self.tasks[id.0].children.len() {
            let child = self.tasks[id.0].children[index];
            self.hard_reset(child, env);
        }
        self.setup(id, env);
    }

    fn setup<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) {
        let node = self.tasks[id.0].node;
        let state = match &self.tasks[id.0].state {
            TaskState::Action { repeat_max, .. } => TaskState::Action {
                repeat_max: *repeat_max,
                repeat_num: 0,
            },
            TaskState::Wait { .. } => TaskState::Wait {
                remaining: self.evaluate(env.pattern, node, id, env.manager),
            },
            TaskState::ChangeDirection(_) => {
                TaskState::ChangeDirection(self.setup_direction_change(node, id, env))
            }
            TaskState::ChangeSpeed(_) => {
                TaskState::ChangeSpeed(self.setup_speed_change(node, id, env))
            }
            TaskState::Accel(_) => TaskState::Accel(self.setup_accel(node, id, env)),
            _ => return,
        };
        self.tasks[id.0].state = state;
    }

    fn setup_direction_change<M: BulletManager>(
        &self,
        node: NodeId,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> DirectionChange {
        let duration = self.child_value(env.pattern, node, NodeKind::Term, id, env.manager);
        let target =
            self.typed_child_value(env.pattern, node, NodeKind::Direction, id, env.manager);
        let (policy, value) = match target {
            Some((policy, value)) => (policy, Some(value)),
            None => (NodeType::None, None),
        };
        let current = env.entity.direction();
        DirectionChange::new(policy, value, duration.unwrap_or(0.0), current, || env.aim())
    }

    fn setup_speed_change<M: BulletManager>(
        &self,
        node: NodeId,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> SpeedChange {
        let duration = self.child_value(env.pattern, node, NodeKind::Term, id, env.manager);
        let target = self.typed_child_value(env.pattern, node, NodeKind::Speed, id, env.manager);
        let (policy, value) = match target {
            Some((policy, value)) => (policy, Some(value)),
            None => (NodeType::None, None),
        };
        SpeedChange::new(policy, value, duration.unwrap_or(0.0), env.entity.speed())
    }

    fn setup_accel<M: BulletManager>(
        &self,
        node: NodeId,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> AccelChange {
        let duration = self.child_value(env.pattern, node, NodeKind::Term, id, env.manager);
        let horizontal =
            self.typed_child_value(env.pattern, node, NodeKind::Horizontal, id, env.manager);
        let vertical =
            self.typed_child_value(env.pattern, node, NodeKind::Vertical, id, env.manager);
        AccelChange::new(
            horizontal,
            vertical,
            duration.unwrap_or(0.0),
            env.entity.acceleration(),
        )
    }

    /// Evaluate `node`'s expression in the context of `task`
    pub(crate) fn evaluate<M: BulletManager>(
        &self,
        pattern: &Pattern,
        node: NodeId,
        task: TaskId,
        manager: &mut M,
    ) -> f32 {
        let mut scope = EvalScope::new(self, task, manager);
        pattern.tree().value(node, &mut scope)
    }

    fn child_value<M: BulletManager>(
        &self,
        pattern: &Pattern,
        node: NodeId,
        kind: NodeKind,
        task: TaskId,
        manager: &mut M,
    ) -> Option<f32> {
        let child = pattern.tree().get_child(node, kind)?;
        Some(self.evaluate(pattern, child, task, manager))
    }

    fn typed_child_value<M: BulletManager>(
        &self,
        pattern: &Pattern,
        node: NodeId,
        kind: NodeKind,
        task: TaskId,
        manager: &mut M,
    ) -> Option<(NodeType, f32)> {
        let child = pattern.tree().get_child(node, kind)?;
        let policy = pattern.tree().node(child).node_type;
        Some((policy, self.evaluate(pattern, child, task, manager)))
    }
}
