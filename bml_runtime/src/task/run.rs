//! One tick of a task tree

use super::{Env, RunStatus, TaskId, TaskState, TaskTree};
use crate::host::{BulletManager, Entity};
use bml_compiler::log_debug;

impl TaskTree {
    pub(crate) fn run<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) -> RunStatus {
        match self.tasks[id.0].state {
            TaskState::Composite | TaskState::Repeat => self.run_children(id, env),
            TaskState::Action { .. } => self.run_action(id, env),
            TaskState::Fire(_) => self.run_fire(id, env),
            TaskState::Wait { .. } => self.run_wait(id, env),
            TaskState::ChangeDirection(_) => self.run_direction_change(id, env),
            TaskState::ChangeSpeed(_) => self.run_speed_change(id, env),
            TaskState::Accel(_) => self.run_accel(id, env),
            TaskState::Vanish => {
                log_debug!("Entity vanished", "node" => self.tasks[id.0].node);
                env.manager.remove_entity(&*env.entity);
                self.finish(id)
            }
        }
    }

    /// Run unfinished children in order until one stops
    fn run_children<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) -> RunStatus {
        let mut finished = true;
        for index in 0..self.tasks[id.0].children.len() {
            let child = self.tasks[id.0].children[index];
            if self.tasks[child.0].finished {
                continue;
            }
            match self.run(child, env) {
                RunStatus::Stop => {
                    self.tasks[id.0].finished = false;
                    return RunStatus::Stop;
                }
                RunStatus::Continue => finished = false,
                RunStatus::End => {}
            }
        }

        self.tasks[id.0].finished = finished;
        if finished {
            RunStatus::End
        } else {
            RunStatus::Continue
        }
    }

    /// Run the body up to `repeat_max` times, re-initialising it between passes
    fn run_action<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) -> RunStatus {
        loop {
            let TaskState::Action {
                repeat_max,
                repeat_num,
            } = self.tasks[id.0].state
            else {
                break;
            };
            if repeat_num >= repeat_max {
                break;
            }

            match self.run_children(id, env) {
                RunStatus::End => {
                    if let TaskState::Action { repeat_num, .. } = &mut self.tasks[id.0].state {
                        *repeat_num += 1;
                    }
                    for index in 0..self.tasks[id.0].children.len() {
                        let child = self.tasks[id.0].children[index];
                        self.init_task(child, env);
                    }
                }
                status => return status,
            }
        }
        self.finish(id)
    }

    fn run_wait<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) -> RunStatus {
        let time_scale = env.entity.time_scale();
        let TaskState::Wait { remaining } = &mut self.tasks[id.0].state else {
            return RunStatus::End;
        };
        *remaining -= time_scale;
        if *remaining >= 0.0 {
            RunStatus::Stop
        } else {
            self.finish(id)
        }
    }

    fn run_direction_change<M: BulletManager>(
        &mut self,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> RunStatus {
        let TaskState::ChangeDirection(change) = &mut self.tasks[id.0].state else {
            return RunStatus::End;
        };
        let (direction, done) = change.step(env.entity.direction(), env.entity.time_scale());
        env.entity.set_direction(direction);
        self.end_if(id, done)
    }

    fn run_speed_change<M: BulletManager>(
        &mut self,
        id: TaskId,
        env: &mut Env<'_, M>,
    ) -> RunStatus {
        let TaskState::ChangeSpeed(change) = &mut self.tasks[id.0].state else {
            return RunStatus::End;
        };
        let (speed, done) = change.step(env.entity.speed(), env.entity.time_scale());
        env.entity.set_speed(speed);
        self.end_if(id, done)
    }

    fn run_accel<M: BulletManager>(&mut self, id: TaskId, env: &mut Env<'_, M>) -> RunStatus {
        let TaskState::Accel(change) = &mut self.tasks[id.0].state else {
            return RunStatus::End;
        };
        let (acceleration, done) = change.step(env.entity.acceleration(), env.entity.time_scale());
        env.entity.set_acceleration(acceleration);
        self.end_if(id, done)
    }

    fn end_if(&mut self, id: TaskId, done: bool) -> RunStatus {
        if done {
            self.finish(id)
        } else {
            RunStatus::Continue
        }
    }

    fn finish(&mut self, id: TaskId) -> RunStatus {
        self.tasks[id.0].finished = true;
        RunStatus::End
    }
}
