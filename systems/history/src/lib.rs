#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Linear undo/redo history for terrain editing.
//!
//! [`History`] is generic over any command implementing [`Edit`]; the
//! terrain-specific commands live in [`TerrainEdit`] and are built from the
//! current world by the helpers in [`brush`]. History has no branches: running
//! or recording a new command discards everything that was undone.

pub mod brush;
mod terrain;

use std::collections::VecDeque;

use tracing::trace;

pub use terrain::{HeightEdit, PaintEdit, PointEdit, TerrainEdit, WorldEditor};

/// Number of undoable commands kept by [`Config::default`].
pub const DEFAULT_CAPACITY: usize = 50;

/// A reversible edit applied to a target of type `T`.
///
/// Commands capture all the state they need when they are built, so both
/// directions take `&self`.
pub trait Edit<T: ?Sized> {
    /// Applies, or reapplies, the edit.
    fn redo(&self, target: &mut T);

    /// Reverts the edit.
    fn undo(&self, target: &mut T);
}

/// Ordered group of commands undone and redone as a single unit.
///
/// Redo runs the commands in order; undo runs them in reverse.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite<C> {
    commands: Vec<C>,
}

impl<C> Composite<C> {
    /// Groups the provided commands.
    #[must_use]
    pub fn new(commands: Vec<C>) -> Self {
        Self { commands }
    }

    /// Grouped commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[C] {
        &self.commands
    }

    /// Number of grouped commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Reports whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<T: ?Sized, C: Edit<T>> Edit<T> for Composite<C> {
    fn redo(&self, target: &mut T) {
        for command in &self.commands {
            command.redo(target);
        }
    }

    fn undo(&self, target: &mut T) {
        for command in self.commands.iter().rev() {
            command.undo(target);
        }
    }
}

/// Configuration parameters required to construct a history.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    capacity: usize,
}

impl Config {
    /// Creates a configuration that keeps at most `capacity` undoable commands.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Maximum number of undoable commands.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Bounded undo stack paired with a redo stack.
#[derive(Clone, Debug)]
pub struct History<C> {
    capacity: usize,
    undo_stack: VecDeque<C>,
    redo_stack: Vec<C>,
}

impl<C> History<C> {
    /// Creates an empty history.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            capacity: config.capacity,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Applies `command` to `target` and records it.
    pub fn execute<T: ?Sized>(&mut self, command: C, target: &mut T)
    where
        C: Edit<T>,
    {
        command.redo(target);
        self.record(command);
    }

    /// Records a command whose effect was already applied elsewhere.
    ///
    /// Clears the redo stack and evicts the oldest entries beyond capacity.
    pub fn record(&mut self, command: C) {
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.capacity {
            let _ = self.undo_stack.pop_front();
            trace!(capacity = self.capacity, "evicted oldest history entry");
        }
    }

    /// Reverts the most recent command, returning it, or `None` when nothing is undoable.
    pub fn undo<T: ?Sized>(&mut self, target: &mut T) -> Option<&C>
    where
        C: Edit<T>,
    {
        let command = self.undo_stack.pop_back()?;
        command.undo(target);
        self.redo_stack.push(command);
        self.redo_stack.last()
    }

    /// Reapplies the most recently undone command, returning it, or `None` when nothing is redoable.
    pub fn redo<T: ?Sized>(&mut self, target: &mut T) -> Option<&C>
    where
        C: Edit<T>,
    {
        let command = self.redo_stack.pop()?;
        command.redo(target);
        self.undo_stack.push_back(command);
        self.undo_stack.back()
    }

    /// Reports whether [`History::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Reports whether [`History::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable commands.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable commands.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forgets every recorded command.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<C> Default for History<C> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Add(i64);

    impl Edit<i64> for Add {
        fn redo(&self, target: &mut i64) {
            *target += self.0;
        }

        fn undo(&self, target: &mut i64) {
            *target -= self.0;
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Named(&'static str);

    impl Edit<Vec<String>> for Named {
        fn redo(&self, log: &mut Vec<String>) {
            log.push(format!("{}.redo", self.0));
        }

        fn undo(&self, log: &mut Vec<String>) {
            log.push(format!("{}.undo", self.0));
        }
    }

    #[test]
    fn execute_undo_redo_round_trip() {
        let mut history = History::default();
        let mut total = 0;

        history.execute(Add(3), &mut total);
        history.execute(Add(4), &mut total);
        assert_eq!(total, 7);

        assert_eq!(history.undo(&mut total), Some(&Add(4)));
        assert_eq!(total, 3);
        assert_eq!(history.redo(&mut total), Some(&Add(4)));
        assert_eq!(total, 7);
    }

    #[test]
    fn empty_stacks_return_none() {
        let mut history: History<Add> = History::default();
        let mut total = 0;
        assert_eq!(history.undo(&mut total), None);
        assert_eq!(history.redo(&mut total), None);
        assert_eq!(total, 0);
    }

    #[test]
    fn new_command_discards_redo_stack() {
        let mut history = History::default();
        let mut total = 0;
        history.execute(Add(1), &mut total);
        history.execute(Add(2), &mut total);
        let _ = history.undo(&mut total);
        assert!(history.can_redo());

        history.execute(Add(10), &mut total);

        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut total), None);
        assert_eq!(total, 11);
    }

    #[test]
    fn clear_forgets_both_stacks() {
        let mut history = History::default();
        let mut total = 0;
        history.execute(Add(1), &mut total);
        history.execute(Add(2), &mut total);
        let _ = history.undo(&mut total);

        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(&mut total), None);
        assert_eq!(total, 1);
    }

    #[test]
    fn record_skips_application() {
        let mut history = History::default();
        let mut total = 5;
        history.record(Add(5));
        assert_eq!(total, 5);

        let _ = history.undo(&mut total);
        assert_eq!(total, 0);
    }

    #[test]
    fn record_also_discards_redo_stack() {
        let mut history = History::default();
        let mut total = 0;
        history.execute(Add(1), &mut total);
        let _ = history.undo(&mut total);

        history.record(Add(2));

        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn oldest_entries_are_evicted_beyond_capacity() {
        let mut history = History::default();
        let mut total = 0;
        for value in 1..=60 {
            history.execute(Add(value), &mut total);
        }

        assert_eq!(history.undo_len(), DEFAULT_CAPACITY);
        while history.undo(&mut total).is_some() {}
        let evicted: i64 = (1..=10).sum();
        assert_eq!(total, evicted);
        assert_eq!(history.redo_len(), DEFAULT_CAPACITY);

        while history.redo(&mut total).is_some() {}
        assert_eq!(history.undo_len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn composite_undoes_in_reverse_and_redoes_in_order() {
        let mut history = History::default();
        let mut log = Vec::new();
        let composite = Composite::new(vec![Named("a"), Named("b")]);

        history.execute(composite, &mut log);
        let _ = history.undo(&mut log);
        let _ = history.redo(&mut log);

        assert_eq!(
            log,
            vec!["a.redo", "b.redo", "b.undo", "a.undo", "a.redo", "b.redo"]
        );
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = History::new(Config::new(0));
        let mut total = 0;
        history.execute(Add(1), &mut total);
        assert_eq!(total, 1);
        assert!(!history.can_undo());
    }
}
