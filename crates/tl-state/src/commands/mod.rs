//! Reversible timeline edits
//!
//! Every edit is an [`EditCommand`] operating on a [`Sequence`]. Commands
//! snapshot their "before" state in `prepare`, which runs once, lazily, right
//! before the first `redo`. That lets a compound edit build all of its children
//! up front while each child still observes the changes made by the children
//! before it.
//!
//! [`SequenceCommand`] adapts an edit onto the undo stack's [`Command`] trait.

use crate::{Command, Sequence, SequenceHandle};

mod block;
mod place;
mod ripple;
mod slide;
mod split;
mod track;
mod trim;

#[cfg(test)]
pub(crate) mod testing;

pub use block::*;
pub use place::*;
pub use ripple::*;
pub use slide::*;
pub use split::*;
pub use track::*;
pub use trim::*;

/// A reversible edit on the sequence model
pub trait EditCommand: Send + Sync {
    /// Snapshot whatever `undo` will need; called once before the first `redo`
    fn prepare(&mut self, _seq: &Sequence) {}

    /// Apply the edit
    fn redo(&mut self, seq: &mut Sequence);

    /// Revert the edit exactly
    fn undo(&mut self, seq: &mut Sequence);

    /// Get command name for display
    fn name(&self) -> &str;

    /// True after `prepare` if the edit would change nothing
    fn is_noop(&self) -> bool {
        false
    }
}

/// Lifecycle of one edit inside the undo stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Unprepared,
    Prepared,
    Applied,
}

/// An edit plus its prepare/apply state
pub struct EditStep {
    command: Box<dyn EditCommand>,
    state: StepState,
}

impl EditStep {
    pub fn new(command: impl EditCommand + 'static) -> Self {
        Self::boxed(Box::new(command))
    }

    pub fn boxed(command: Box<dyn EditCommand>) -> Self {
        Self {
            command,
            state: StepState::Unprepared,
        }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn name(&self) -> &str {
        self.command.name()
    }

    /// Only meaningful once prepared
    pub fn is_noop(&self) -> bool {
        self.state != StepState::Unprepared && self.command.is_noop()
    }

    pub fn redo_now(&mut self, seq: &mut Sequence) {
        if self.state == StepState::Applied {
            return;
        }
        if self.state == StepState::Unprepared {
            self.command.prepare(seq);
            self.state = StepState::Prepared;
        }
        self.command.redo(seq);
        self.state = StepState::Applied;
    }

    pub fn undo_now(&mut self, seq: &mut Sequence) {
        if self.state == StepState::Applied {
            self.command.undo(seq);
            self.state = StepState::Prepared;
        }
    }
}

/// Children applied in order and reverted in reverse order
pub struct MultiEditCommand {
    name: String,
    steps: Vec<EditStep>,
}

impl MultiEditCommand {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn add(&mut self, command: impl EditCommand + 'static) {
        self.steps.push(EditStep::new(command));
    }

    pub fn add_boxed(&mut self, command: Box<dyn EditCommand>) {
        self.steps.push(EditStep::boxed(command));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl EditCommand for MultiEditCommand {
    fn redo(&mut self, seq: &mut Sequence) {
        for step in &mut self.steps {
            step.redo_now(seq);
        }
    }

    fn undo(&mut self, seq: &mut Sequence) {
        for step in self.steps.iter_mut().rev() {
            step.undo_now(seq);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_noop(&self) -> bool {
        self.steps.iter().all(|s| s.is_noop())
    }
}

/// Undo-stack adapter holding the shared sequence
pub struct SequenceCommand {
    sequence: SequenceHandle,
    step: EditStep,
}

impl SequenceCommand {
    pub fn new(sequence: SequenceHandle, command: impl EditCommand + 'static) -> Self {
        Self {
            sequence,
            step: EditStep::new(command),
        }
    }

    pub fn boxed(sequence: SequenceHandle, command: Box<dyn EditCommand>) -> Self {
        Self {
            sequence,
            step: EditStep::boxed(command),
        }
    }
}

impl Command for SequenceCommand {
    fn execute(&mut self) {
        let mut seq = self.sequence.write();
        self.step.redo_now(&mut seq);
    }

    fn undo(&mut self) {
        let mut seq = self.sequence.write();
        self.step.undo_now(&mut seq);
    }

    fn name(&self) -> &str {
        self.step.name()
    }

    fn is_noop(&self) -> bool {
        self.step.is_noop()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::UndoManager;
    use tl_core::seconds;

    #[test]
    fn test_sequence_command_on_undo_stack() {
        let (seq, track, ids) = clips_track(&[5, 5]);
        let handle = seq.into_handle();
        let mut manager = UndoManager::new(10);

        let pushed = manager.execute(Box::new(SequenceCommand::new(
            handle.clone(),
            TrackRippleRemoveBlockCommand::new(ids[0]),
        )));
        assert!(pushed);
        assert_eq!(layout(&handle.read(), track), vec![('C', 0, 5)]);

        assert!(manager.undo());
        assert_eq!(layout(&handle.read(), track), vec![('C', 0, 5), ('C', 5, 10)]);
        assert!(manager.redo());
        assert_eq!(handle.read().track(track).map(|t| t.length()), Some(seconds(5)));
    }

    #[test]
    fn test_noop_edit_is_dropped() {
        let (seq, _, ids) = clips_track(&[5]);
        let handle = seq.into_handle();
        let mut manager = UndoManager::new(10);
        let pushed = manager.execute(Box::new(SequenceCommand::new(
            handle,
            BlockResizeCommand::new(ids[0], seconds(5)),
        )));
        assert!(!pushed);
        assert!(!manager.can_undo());
    }

    #[test]
    fn test_multi_edit_prepares_children_lazily() {
        let (mut seq, track, ids) = clips_track(&[5, 5, 5]);
        let before = seq.snapshot();

        // The second child only sees the right neighbour after the first ran
        let mut multi = MultiEditCommand::new("Remove Two");
        multi.add(TrackRippleRemoveBlockCommand::new(ids[0]));
        multi.add(TrackRippleRemoveBlockCommand::new(ids[1]));
        let mut step = EditStep::new(multi);

        step.redo_now(&mut seq);
        assert_eq!(layout(&seq, track), vec![('C', 0, 5)]);
        step.undo_now(&mut seq);
        assert_eq!(seq.snapshot(), before);
        step.redo_now(&mut seq);
        assert_eq!(seq.block(ids[2]).map(|b| b.in_point()), Some(seconds(0)));
        assert!(seq.check_invariants().is_ok());
    }
}
