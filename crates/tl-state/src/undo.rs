//! Undo/Redo system using command pattern

use std::collections::VecDeque;

/// Trait for undoable commands
pub trait Command: Send + Sync {
    /// Execute the command
    fn execute(&mut self);

    /// Undo the command
    fn undo(&mut self);

    /// Get command name for display
    fn name(&self) -> &str;

    /// Whether this command can be merged with a previous command
    fn can_merge(&self, _other: &dyn Command) -> bool {
        false
    }

    /// Merge with previous command (called if can_merge returns true)
    fn merge(&mut self, _other: Box<dyn Command>) {}

    /// True once executed if the command changed nothing
    fn is_noop(&self) -> bool {
        false
    }
}

/// Undo/Redo manager
pub struct UndoManager {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_history: usize,
    group_depth: usize,
    group_commands: Vec<Box<dyn Command>>,
    keep_noop_commands: bool,
}

impl UndoManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_history),
            redo_stack: Vec::new(),
            max_history: max_history.max(1),
            group_depth: 0,
            group_commands: Vec::new(),
            keep_noop_commands: false,
        }
    }

    /// Push commands that turned out to change nothing (off by default)
    pub fn set_keep_noop_commands(&mut self, keep: bool) {
        self.keep_noop_commands = keep;
    }

    /// Execute a command and add it to the undo stack
    ///
    /// Returns false if the command changed nothing and was dropped.
    pub fn execute(&mut self, mut command: Box<dyn Command>) -> bool {
        command.execute();

        if command.is_noop() && !self.keep_noop_commands {
            log::debug!("dropping no-op command '{}'", command.name());
            return false;
        }
        log::debug!("executed '{}'", command.name());

        if self.group_depth > 0 {
            self.group_commands.push(command);
        } else {
            self.push_command(command);
        }

        // Clear redo stack on new command
        self.redo_stack.clear();
        true
    }

    fn push_command(&mut self, command: Box<dyn Command>) {
        // Try to merge with previous command
        if let Some(last) = self.undo_stack.back_mut()
            && last.can_merge(command.as_ref())
        {
            last.merge(command);
            return;
        }

        // Enforce max history
        while self.undo_stack.len() >= self.max_history {
            self.undo_stack.pop_front();
        }

        self.undo_stack.push_back(command);
    }

    /// Undo the last command
    pub fn undo(&mut self) -> bool {
        if let Some(mut command) = self.undo_stack.pop_back() {
            log::debug!("undo '{}'", command.name());
            command.undo();
            self.redo_stack.push(command);
            true
        } else {
            false
        }
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> bool {
        if let Some(mut command) = self.redo_stack.pop() {
            log::debug!("redo '{}'", command.name());
            command.execute();
            self.undo_stack.push_back(command);
            true
        } else {
            false
        }
    }

    /// Start a command group (grouped commands are undone/redone together)
    pub fn begin_group(&mut self) {
        self.group_depth += 1;
    }

    /// End a command group
    pub fn end_group(&mut self, name: &str) {
        if self.group_depth > 0 {
            self.group_depth -= 1;

            if self.group_depth == 0 && !self.group_commands.is_empty() {
                let commands = std::mem::take(&mut self.group_commands);
                let group = CommandGroup::new(name, commands);
                self.push_command(Box::new(group));
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the name of the next undo command
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.name())
    }

    /// Get the name of the next redo command
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.name())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_commands.clear();
        self.group_depth = 0;
    }

    /// Get number of undo steps
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get number of redo steps
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

/// Commands executed in order and undone in reverse as one step
pub struct CommandGroup {
    name: String,
    commands: Vec<Box<dyn Command>>,
}

impl CommandGroup {
    pub fn new(name: &str, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            name: name.to_string(),
            commands,
        }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CommandGroup {
    fn execute(&mut self) {
        for cmd in &mut self.commands {
            cmd.execute();
        }
    }

    fn undo(&mut self) {
        for cmd in self.commands.iter_mut().rev() {
            cmd.undo();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_noop(&self) -> bool {
        self.commands.iter().all(|c| c.is_noop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct SetValueCommand {
        value: Arc<Mutex<i32>>,
        old_value: i32,
        new_value: i32,
    }

    impl Command for SetValueCommand {
        fn execute(&mut self) {
            let mut v = self.value.lock().unwrap();
            self.old_value = *v;
            *v = self.new_value;
        }

        fn undo(&mut self) {
            *self.value.lock().unwrap() = self.old_value;
        }

        fn name(&self) -> &str {
            "Set Value"
        }

        fn is_noop(&self) -> bool {
            self.old_value == self.new_value
        }
    }

    fn set(value: &Arc<Mutex<i32>>, new_value: i32) -> Box<dyn Command> {
        Box::new(SetValueCommand {
            value: Arc::clone(value),
            old_value: 0,
            new_value,
        })
    }

    #[test]
    fn test_undo_redo() {
        let mut manager = UndoManager::new(100);
        let value = Arc::new(Mutex::new(0));

        manager.execute(set(&value, 1));
        assert_eq!(*value.lock().unwrap(), 1);

        manager.execute(set(&value, 2));
        assert_eq!(*value.lock().unwrap(), 2);

        assert!(manager.undo());
        assert_eq!(*value.lock().unwrap(), 1);

        assert!(manager.redo());
        assert_eq!(*value.lock().unwrap(), 2);
    }

    #[test]
    fn test_group() {
        let mut manager = UndoManager::new(100);
        let value = Arc::new(Mutex::new(0));

        manager.begin_group();
        manager.execute(set(&value, 1));
        manager.execute(set(&value, 2));
        manager.end_group("Multiple Sets");

        assert_eq!(*value.lock().unwrap(), 2);
        assert_eq!(manager.undo_count(), 1);
        assert_eq!(manager.undo_name(), Some("Multiple Sets"));

        assert!(manager.undo());
        assert_eq!(*value.lock().unwrap(), 0);
    }

    #[test]
    fn test_noop_is_not_pushed() {
        let mut manager = UndoManager::new(100);
        let value = Arc::new(Mutex::new(3));

        assert!(!manager.execute(set(&value, 3)));
        assert!(!manager.can_undo());

        manager.set_keep_noop_commands(true);
        assert!(manager.execute(set(&value, 3)));
        assert_eq!(manager.undo_count(), 1);
    }

    #[test]
    fn test_history_limit() {
        let mut manager = UndoManager::new(2);
        let value = Arc::new(Mutex::new(0));
        for i in 1..=4 {
            manager.execute(set(&value, i));
        }
        assert_eq!(manager.undo_count(), 2);
    }
}
