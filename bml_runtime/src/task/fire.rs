//! Fire tasks
//!
//! Direction and speed are computed when the fire runs, so aimed shots see
//! where the target is at that tick. Sequence values accumulate on top of the
//! previous shot; the first shot after a hard reset uses the initial value.

use super::kinematics::{normalize_direction, wrap_angle};
use super::{Env, RunStatus, TaskId, TaskState, TaskTree};
use crate::bullet::Bullet;
use crate::host::{BulletManager, Emission, Entity};
use bml_compiler::ast::{NodeId, NodeType};
use bml_compiler::logging::codes;
use bml_compiler::{log_debug, log_error, log_warning};
use std::sync::Arc;

/// Where a value expression lives and which task evaluates it
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ValueSource {
    pub node: NodeId,
    pub context: TaskId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FireState {
    /// Task standing for the bullet description; its node is what gets bound
    pub holder: Option<TaskId>,
    pub initial_direction: Option<ValueSource>,
    pub sequence_direction: Option<ValueSource>,
    pub initial_speed: Option<ValueSource>,
    pub sequence_speed: Option<ValueSource>,
    /// Last shot, direction in radians within (-π, π]
    pub direction: f32,
    pub speed: f32,
    pub times_fired: u32,
}

impl TaskTree {
    pub(crate) fn run_fire<M: BulletManager>(
        &mut self,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> RunStatus {
        let TaskState::Fire(state) = &self.tasks[id.0].state else {
            return RunStatus::End;
        };
        let state = FireState::clone(state);

        let direction = self.shot_direction(&state, env);
        let speed = self.shot_speed(&state, env);
        if let TaskState::Fire(fire) = &mut self.tasks[id.0].state {
            fire.direction = direction;
            fire.speed = speed;
            fire.times_fired += 1;
        }
        trace_task!("fire {:?}: direction {} speed {}", id, direction, speed);

        self.spawn(id, state.holder, direction, speed, env);
        self.tasks[id.0].finished = true;
        RunStatus::End
    }

    fn shot_direction<M: BulletManager>(&self, state: &FireState, env: &mut Env<'_, M>) -> f32 {
        let sequence = state.sequence_direction.filter(|_| state.times_fired > 0);
        let direction = match (sequence, state.initial_direction) {
            (Some(source), _) => state.direction + self.source_value(source, env).to_radians(),
            (None, Some(source)) => {
                let value = self.source_value(source, env).to_radians();
                match env.pattern.tree().node(source.node).node_type {
                    NodeType::Absolute => value,
                    NodeType::Relative => value + env.entity.direction(),
                    _ => value + env.aim(),
                }
            }
            (None, None) => env.aim(),
        };
        wrap_angle(direction)
    }

    fn shot_speed<M: BulletManager>(&self, state: &FireState, env: &mut Env<'_, M>) -> f32 {
        let sequence = state.sequence_speed.filter(|_| state.times_fired > 0);
        match (sequence, state.initial_speed) {
            (Some(source), _) => state.speed + self.source_value(source, env),
            (None, Some(source)) => {
                let value = self.source_value(source, env);
                match env.pattern.tree().node(source.node).node_type {
                    NodeType::Relative => value + env.entity.speed(),
                    _ => value,
                }
            }
            (None, None) => env.entity.speed(),
        }
    }

    fn source_value<M: BulletManager>(&self, source: ValueSource, env: &mut Env<'_, M>) -> f32 {
        self.evaluate(env.pattern, source.node, source.context, env.manager)
    }

    /// Ask the host for an entity and bind the bullet description to it
    fn spawn<M: BulletManager>(
        &self,
        fire: TaskId,
        holder: Option<TaskId>,
        direction: f32,
        speed: f32,
        env: &mut Env<'_, M>,
    ) {
        let Some(holder) = holder else {
            log_error!(
                codes::runtime::UNRESOLVED_AT_RUNTIME,
                "Fire has no bullet description",
                "node" => self.tasks[fire.0].node
            );
            return;
        };

        let emission = Emission {
            emitter: env.emitter,
            position: env.entity.position(),
        };
        let Some(mut entity) = env.manager.create_entity(&emission) else {
            log_warning!(
                code = codes::runtime::SPAWN_FAILED,
                "Host refused to create an entity; shot skipped",
                "node" => self.tasks[fire.0].node
            );
            return;
        };
        if entity.emitter() != Some(env.emitter) {
            log_warning!(
                code = codes::runtime::DETACHED_ENTITY,
                "Created entity is not attached to the firing emitter; shot skipped",
                "emitter" => env.emitter.0
            );
            env.manager.remove_entity(&entity);
            return;
        }

        entity.set_position(emission.position);
        entity.set_direction(normalize_direction(direction));
        entity.set_speed(speed);

        let bullet_node = self.tasks[holder.0].node;
        let scope = self.capture_scope(holder);
        match Bullet::bind_with_scope(
            entity,
            Arc::clone(env.pattern),
            bullet_node,
            Some(scope),
            env.emitter,
            env.manager,
        ) {
            Ok(bullet) => {
                log_debug!("Bullet fired", "node" => bullet_node, "speed" => speed);
                env.manager.spawn(bullet);
            }
            Err(error) => log_error!(error.error_code(), &error.to_string(), "node" => bullet_node),
        }
    }
}
