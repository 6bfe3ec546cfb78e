//! Task tree construction
//!
//! Mirrors the executable children of a pattern node. References are
//! expanded in place: an `actionRef` becomes an action task holding the
//! evaluated arguments, with the referenced action as its first child. A
//! `fireRef` becomes a fire task on the referenced fire node.
//!
//! Repeat counts and reference arguments are evaluated here, once, in the
//! context of the task that encloses them.

use super::fire::{FireState, ValueSource};
use super::{ParamScope, Task, TaskId, TaskState, TaskTree};
use super::{AccelChange, DirectionChange, SpeedChange};
use crate::error::{RuntimeError, RuntimeResult};
use crate::host::BulletManager;
use bml_compiler::ast::{NodeId, NodeKind, NodeType};
use bml_compiler::config::compile_time::runtime::{
    MAX_REFERENCE_EXPANSION_DEPTH, MAX_TASKS_PER_TREE,
};
use bml_compiler::Pattern;
use std::sync::Arc;

impl TaskTree {
    /// Build the tree for the pattern subtree at `node`
    ///
    /// `scope` is attached before anything is evaluated, so repeat counts
    /// and arguments computed here already see inherited parameters.
    pub(crate) fn build<M: BulletManager>(
        pattern: &Pattern,
        node: NodeId,
        scope: Option<Arc<ParamScope>>,
        manager: &mut M,
    ) -> RuntimeResult<Self> {
        let mut tree = Self {
            tasks: Vec::new(),
            root: TaskId(0),
            scope,
        };
        let root = tree.push(node, None, TaskState::Composite)?;
        tree.root = root;
        tree.parse_children(pattern, root, manager, 0)?;

        trace_task!("built task tree for {} with {} tasks", node, tree.tasks.len());
        Ok(tree)
    }

    fn push(
        &mut self,
        node: NodeId,
        owner: Option<TaskId>,
        state: TaskState,
    ) -> RuntimeResult<TaskId> {
        if self.tasks.len() >= MAX_TASKS_PER_TREE {
            return Err(RuntimeError::TaskLimitExceeded {
                limit: MAX_TASKS_PER_TREE,
            });
        }

        let id = TaskId(self.tasks.len());
        self.tasks.push(Task {
            node,
            owner,
            children: Vec::new(),
            params: Vec::new(),
            finished: false,
            state,
        });
        if let Some(owner) = owner {
            self.tasks[owner.0].children.push(id);
        }
        Ok(id)
    }

    fn parse_children<M: BulletManager>(
        &mut self,
        pattern: &Pattern,
        parent: TaskId,
        manager: &mut M,
        depth: usize,
    ) -> RuntimeResult<()> {
        let node = self.tasks[parent.0].node;
        for &child in pattern.tree().children(node) {
            self.parse_child(pattern, parent, child, manager, depth)?;
        }
        Ok(())
    }

    fn parse_child<M: BulletManager>(
        &mut self,
        pattern: &Pattern,
        parent: TaskId,
        child: NodeId,
        manager: &mut M,
        depth: usize,
    ) -> RuntimeResult<()> {
        let kind = pattern.tree().node(child).kind;
        match kind {
            NodeKind::Repeat => {
                let id = self.push(child, Some(parent), TaskState::Repeat)?;
                self.parse_children(pattern, id, manager, depth)?;
            }
            NodeKind::Action => {
                let repeat_max = self.repeat_count(pattern, child, parent, manager);
                let id = self.push(child, Some(parent), action(repeat_max))?;
                self.parse_children(pattern, id, manager, depth)?;
            }
            NodeKind::ActionRef => {
                let target = self.follow(pattern, child, depth)?;
                let repeat_max = self.repeat_count(pattern, child, parent, manager);
                let params = self.arguments(pattern, child, parent, manager);

                let id = self.push(child, Some(parent), action(repeat_max))?;
                self.tasks[id.0].params = params;

                // the referenced action's own repeat count sees the arguments
                let inner_max = self.repeat_count(pattern, target, id, manager);
                let inner = self.push(target, Some(id), action(inner_max))?;
                self.parse_children(pattern, inner, manager, depth + 1)?;
            }
            NodeKind::ChangeDirection => {
                let state = TaskState::ChangeDirection(DirectionChange::default());
                self.push(child, Some(parent), state)?;
            }
            NodeKind::ChangeSpeed => {
                self.push(child, Some(parent), TaskState::ChangeSpeed(SpeedChange::default()))?;
            }
            NodeKind::Accel => {
                self.push(child, Some(parent), TaskState::Accel(AccelChange::default()))?;
            }
            NodeKind::Wait => {
                self.push(child, Some(parent), TaskState::Wait { remaining: 0.0 })?;
            }
            NodeKind::Vanish => {
                self.push(child, Some(parent), TaskState::Vanish)?;
            }
            NodeKind::Fire => {
                let id = self.push(child, Some(parent), TaskState::Fire(Box::default()))?;
                self.parse_fire(pattern, id, manager)?;
            }
            NodeKind::FireRef => {
                let target = self.follow(pattern, child, depth)?;
                let params = self.arguments(pattern, child, parent, manager);

                let id = self.push(target, Some(parent), TaskState::Fire(Box::default()))?;
                self.tasks[id.0].params = params;
                self.parse_fire(pattern, id, manager)?;
            }
            // value nodes, bullets and bullet references are read by their parents
            _ => {}
        }
        Ok(())
    }

    /// Attach the bullet holder and pick the direction and speed sources
    fn parse_fire<M: BulletManager>(
        &mut self,
        pattern: &Pattern,
        fire: TaskId,
        manager: &mut M,
    ) -> RuntimeResult<()> {
        let tree = pattern.tree();
        let fire_node = self.tasks[fire.0].node;

        let mut holder = None;
        for &child in tree.children(fire_node) {
            match tree.node(child).kind {
                NodeKind::BulletRef => {
                    let target = pattern
                        .referenced(child)
                        .ok_or_else(|| RuntimeError::unresolved(NodeKind::BulletRef, child))?;
                    let params = self.arguments(pattern, child, fire, manager);
                    let id = self.push(target, Some(fire), TaskState::Composite)?;
                    self.tasks[id.0].params = params;
                    holder = Some(id);
                }
                NodeKind::Bullet => {
                    holder = Some(self.push(child, Some(fire), TaskState::Composite)?);
                }
                _ => {}
            }
        }

        let mut state = FireState {
            holder,
            ..FireState::default()
        };
        // the fire's own values win over the bullet description's
        for context in std::iter::once(fire).chain(holder) {
            let node = self.tasks[context.0].node;
            if let Some(direction) = tree.get_child(node, NodeKind::Direction) {
                let source = ValueSource { node: direction, context };
                if tree.node(direction).node_type == NodeType::Sequence {
                    state.sequence_direction.get_or_insert(source);
                } else {
                    state.initial_direction.get_or_insert(source);
                }
            }
            if let Some(speed) = tree.get_child(node, NodeKind::Speed) {
                let source = ValueSource { node: speed, context };
                if tree.node(speed).node_type == NodeType::Sequence {
                    state.sequence_speed.get_or_insert(source);
                } else {
                    state.initial_speed.get_or_insert(source);
                }
            }
        }

        self.tasks[fire.0].state = TaskState::Fire(Box::new(state));
        Ok(())
    }

    fn follow(&self, pattern: &Pattern, reference: NodeId, depth: usize) -> RuntimeResult<NodeId> {
        if depth >= MAX_REFERENCE_EXPANSION_DEPTH {
            return Err(RuntimeError::ReferenceDepthExceeded {
                node: reference,
                limit: MAX_REFERENCE_EXPANSION_DEPTH,
            });
        }
        let kind = pattern.tree().node(reference).kind;
        pattern
            .referenced(reference)
            .ok_or_else(|| RuntimeError::unresolved(kind, reference))
    }

    /// Iterations of the repeat enclosing `action`, truncated; 1 outside a repeat
    fn repeat_count<M: BulletManager>(
        &self,
        pattern: &Pattern,
        action: NodeId,
        context: TaskId,
        manager: &mut M,
    ) -> i64 {
        let tree = pattern.tree();
        match tree.node(action).parent_repeat() {
            Some(repeat) => match tree.get_child(repeat, NodeKind::Times) {
                // saturating; NaN becomes 0
                Some(times) => self.evaluate(pattern, times, context, manager).floor() as i64,
                None => 0,
            },
            None => 1,
        }
    }

    /// `param` children of a reference, evaluated in the referencing context
    fn arguments<M: BulletManager>(
        &self,
        pattern: &Pattern,
        reference: NodeId,
        context: TaskId,
        manager: &mut M,
    ) -> Vec<f32> {
        pattern
            .tree()
            .children_of_kind(reference, NodeKind::Param)
            .map(|param| self.evaluate(pattern, param, context, manager))
            .collect()
    }
}

fn action(repeat_max: i64) -> TaskState {
    TaskState::Action {
        repeat_max,
        repeat_num: 0,
    }
}
