//! Emitters: where a pattern enters the world
//!
//! An emitter binds its root entity to the pattern's entry point. A pattern
//! with `top1`..`top9` instead of `top` runs each as its own entity, all
//! starting at the root entity's position.

use crate::bullet::Bullet;
use crate::error::RuntimeResult;
use crate::host::{BulletManager, Emission, EmitterId, Entity, Vec2};
use crate::task::RunStatus;
use bml_compiler::logging::codes;
use bml_compiler::{log_error, log_success, log_warning, Pattern};
use std::sync::Arc;

pub struct Emitter<E: Entity> {
    id: EmitterId,
    pattern: Arc<Pattern>,
    root: Option<Bullet<E>>,
}

impl<E: Entity> Emitter<E> {
    /// Bind `entity` to the pattern's entry points
    ///
    /// Without any entry point the entity is removed and the emitter stays
    /// inactive. An additional entry point that fails to bind is logged and
    /// skipped; only a failure on the first one is returned.
    pub fn new<M: BulletManager<Entity = E>>(
        id: EmitterId,
        entity: E,
        pattern: Arc<Pattern>,
        manager: &mut M,
    ) -> RuntimeResult<Self> {
        let entry_points = pattern.entry_points();
        let Some((&first, extra)) = entry_points.split_first() else {
            log_error!(
                codes::runtime::NO_ENTRY_POINT,
                "Pattern has no top-level action; removing emitter entity",
                "emitter" => id.0
            );
            manager.remove_entity(&entity);
            return Ok(Self {
                id,
                pattern,
                root: None,
            });
        };

        let position = entity.position();
        let root = Bullet::bind(entity, Arc::clone(&pattern), first, id, manager)?;

        for &entry in extra {
            let emission = Emission {
                emitter: id,
                position,
            };
            let Some(mut sibling) = manager.create_entity(&emission) else {
                log_warning!(
                    code = codes::runtime::SPAWN_FAILED,
                    "Host refused an entity for an additional entry point",
                    "node" => entry
                );
                continue;
            };
            sibling.set_position(position);
            // a failed bind has already handed the sibling back to the host
            match Bullet::bind(sibling, Arc::clone(&pattern), entry, id, manager) {
                Ok(bullet) => manager.spawn(bullet),
                Err(error) => log_error!(
                    error.error_code(),
                    &format!("Entry point could not be bound: {}", error),
                    "node" => entry
                ),
            }
        }

        log_success!(
            codes::success::ENTITY_BOUND,
            "Emitter bound to pattern",
            "emitter" => id.0,
            "entry_points" => entry_points.len()
        );
        Ok(Self {
            id,
            pattern,
            root: Some(root),
        })
    }

    /// Move the root entity to `position` and run one tick
    ///
    /// `None` once the emitter has no root entity.
    pub fn update<M: BulletManager<Entity = E>>(
        &mut self,
        position: Vec2,
        manager: &mut M,
    ) -> Option<RunStatus> {
        let root = self.root.as_mut()?;
        root.entity_mut().set_position(position);
        Some(root.update(manager))
    }

    /// Whether the root entity is still bound
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    pub fn id(&self) -> EmitterId {
        self.id
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    pub fn bullet(&self) -> Option<&Bullet<E>> {
        self.root.as_ref()
    }

    pub fn bullet_mut(&mut self) -> Option<&mut Bullet<E>> {
        self.root.as_mut()
    }

    /// Unbind the root entity, handing it back to the caller
    pub fn detach(&mut self) -> Option<E> {
        self.root.take().map(Bullet::into_entity)
    }
}
