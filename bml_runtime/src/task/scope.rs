//! Parameter scoping
//!
//! Inside one tree, `$n` walks the owner chain of the evaluating task. A tree
//! spawned by a fire task additionally carries a [`ParamScope`]: the argument
//! frames of the firing chain, captured when the bullet was fired.

use super::{TaskId, TaskTree};
use crate::host::BulletManager;
use bml_compiler::expression::ExpressionContext;

/// Immutable argument frames inherited by a spawned tree
///
/// Frames are ordered innermost first. A frame no longer than an earlier one
/// can never answer a lookup, so only frames of strictly growing length are
/// kept; the scope stays bounded however many generations a bullet spawns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamScope {
    frames: Vec<Vec<f32>>,
}

impl ParamScope {
    /// `frames` innermost first, followed by everything `parent` holds
    pub fn new(frames: impl IntoIterator<Item = Vec<f32>>, parent: Option<&ParamScope>) -> Self {
        let inherited = parent.into_iter().flat_map(|scope| scope.frames.iter().cloned());
        let mut kept: Vec<Vec<f32>> = Vec::new();
        for frame in frames.into_iter().chain(inherited) {
            if frame.len() > kept.last().map_or(0, Vec::len) {
                kept.push(frame);
            }
        }
        Self { frames: kept }
    }

    /// First frame long enough to hold `$index`
    pub fn param(&self, index: usize) -> Option<f32> {
        let slot = index.checked_sub(1)?;
        self.frames.iter().find_map(|frame| frame.get(slot).copied())
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }
}

/// Expression context for one task of one tree
pub(crate) struct EvalScope<'a, M: BulletManager> {
    tree: &'a TaskTree,
    task: TaskId,
    manager: &'a mut M,
}

impl<'a, M: BulletManager> EvalScope<'a, M> {
    pub(crate) fn new(tree: &'a TaskTree, task: TaskId, manager: &'a mut M) -> Self {
        Self {
            tree,
            task,
            manager,
        }
    }
}

impl<M: BulletManager> ExpressionContext for EvalScope<'_, M> {
    fn param(&self, index: usize) -> Option<f32> {
        self.tree.param(self.task, index)
    }

    fn rank(&self) -> f32 {
        self.manager.difficulty()
    }

    fn random(&mut self) -> f32 {
        self.manager.random()
    }
}
