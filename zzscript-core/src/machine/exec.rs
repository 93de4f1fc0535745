//! Per-entity script interpreter.
//!
//! An [`ExecutionContext`] walks the command list of a single compiled
//! script on behalf of its owner. It's advanced by the host once per game
//! tick. Within a tick the context keeps executing commands for as long as
//! they ask it to continue, with chained jumps capped by the jump budget.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use fnv::FnvHashMap;

use crate::machine::script::Script;
use crate::machine::{ControlResult, Owner, Result};
use crate::var::Var;
use crate::DEFAULT_JUMP_BUDGET;

/// Instruction pointer value of a stopped context.
pub const STOPPED: i64 = -1;

/// Heap keys wrapped in angle brackets only live until the next jump.
pub fn is_transient_key(key: &str) -> bool {
    key.len() >= 2 && key.starts_with('<') && key.ends_with('>')
}

/// Serializable state of an execution context.
///
/// The compiled script itself is not part of it, a snapshot is restored
/// against whatever script the owner currently has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub command_index: i64,
    pub current_labels: BTreeMap<String, usize>,
    pub heap: BTreeMap<String, Var>,
}

impl ContextSnapshot {
    /// State of a context that never ran. Hosts can skip saving these.
    pub fn is_default(&self) -> bool {
        self.command_index == 0
            && self.heap.is_empty()
            && self.current_labels.values().all(|n| *n == 0)
    }
}

/// Script interpreter state for a single owner.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    script: Arc<Script>,
    /// Index of the next command to execute, `STOPPED` after `stop()`
    command_index: i64,
    /// Next occurrence to jump to, per label name
    current_labels: FnvHashMap<String, usize>,
    heap: FnvHashMap<String, Var>,
    message_queue: VecDeque<String>,
    /// Jumps performed during the current tick
    jump_count: usize,
    jump_budget: usize,
}

impl ExecutionContext {
    pub fn new(script: Arc<Script>) -> ExecutionContext {
        let current_labels = script
            .label_indices
            .keys()
            .map(|name| (name.clone(), 0))
            .collect();
        ExecutionContext {
            script,
            command_index: 0,
            current_labels,
            heap: FnvHashMap::default(),
            message_queue: VecDeque::new(),
            jump_count: 0,
            jump_budget: DEFAULT_JUMP_BUDGET,
        }
    }

    /// Sets the number of chained jumps allowed within a single tick, on top
    /// of the first one.
    pub fn with_jump_budget(mut self, jump_budget: usize) -> ExecutionContext {
        self.jump_budget = jump_budget;
        self
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    pub fn command_index(&self) -> i64 {
        self.command_index
    }

    pub fn jump_budget(&self) -> usize {
        self.jump_budget
    }

    /// Context is running while the instruction pointer is within the
    /// command list.
    pub fn is_running(&self) -> bool {
        self.current_index().is_some()
    }

    fn current_index(&self) -> Option<usize> {
        if self.command_index < 0 {
            return None;
        }
        let index = self.command_index as usize;
        if index < self.script.commands.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Stops execution for good. Only a jump brings the context back.
    pub fn stop(&mut self) {
        self.command_index = STOPPED;
    }

    /// Returns the occurrence index the next jump to `name` will use.
    pub fn current_label(&self, name: &str) -> Option<usize> {
        self.current_labels.get(&name.to_lowercase()).cloned()
    }

    pub fn heap(&self) -> &FnvHashMap<String, Var> {
        &self.heap
    }

    pub fn get_var(&self, key: &str) -> Option<&Var> {
        self.heap.get(key)
    }

    pub fn set_var(&mut self, key: &str, var: Var) {
        self.heap.insert(key.to_string(), var);
    }

    pub fn remove_var(&mut self, key: &str) -> Option<Var> {
        self.heap.remove(key)
    }

    /// Queues a message, delivered as a label jump at the start of one of
    /// the following ticks.
    pub fn send(&mut self, message: &str) {
        self.message_queue.push_back(message.to_lowercase());
    }

    pub fn messages(&self) -> &VecDeque<String> {
        &self.message_queue
    }

    /// Jumps to the next available occurrence of the label.
    ///
    /// Returns `false` without touching anything if there is no such label
    /// or all of its occurrences are zapped.
    pub fn jump_to_label(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        let target = match (
            self.script.label_indices.get(&name),
            self.current_labels.get(&name),
        ) {
            (Some(positions), Some(current)) => positions.get(*current).cloned(),
            _ => None,
        };
        match target {
            Some(index) => {
                trace!("{}: jump to label {} at {}", self.script.name, name, index);
                self.jump_to_index(index);
                true
            }
            None => false,
        }
    }

    /// Moves the instruction pointer, counting as a jump.
    pub fn jump_to_index(&mut self, index: usize) {
        self.heap.retain(|key, _| !is_transient_key(key));
        self.command_index = index as i64;
        self.jump_count += 1;
    }

    /// Retires the earliest still available occurrence of the label.
    pub fn zap_label(&mut self, name: &str) {
        let name = name.to_lowercase();
        let len = match self.script.label_indices.get(&name) {
            Some(positions) => positions.len(),
            None => return,
        };
        let current = self.current_labels.entry(name).or_insert(0);
        if *current < len {
            *current += 1;
        }
        trace!("{}: zapped label, now at {}/{}", self.script.name, current, len);
    }

    /// Brings back the most recently zapped occurrence of the label.
    pub fn restore_label(&mut self, name: &str) {
        if let Some(current) = self.current_labels.get_mut(&name.to_lowercase()) {
            *current = current.saturating_sub(1);
        }
    }

    /// Advances the script by one tick.
    ///
    /// Delivers at most one queued message, unless the owner is locked,
    /// then executes commands until one of them ends the tick. Errors
    /// returned by commands abort the tick and are passed on to the caller.
    pub fn tick<O: Owner + ?Sized>(&mut self, owner: &mut O) -> Result<()> {
        if !owner.is_locked() {
            if let Some(message) = self.message_queue.pop_front() {
                self.jump_to_label(&message);
            }
        }
        let script = self.script.clone();
        let result = self.run(owner, &script);
        self.jump_count = 0;
        result
    }

    fn run<O: Owner + ?Sized>(&mut self, owner: &mut O, script: &Script) -> Result<()> {
        while let Some(index) = self.current_index() {
            let jumps = self.jump_count;
            let result = script.commands[index]
                .execute(owner, self)
                .map_err(|e| e.with_command(index).with_source(&script.name))?;
            match result {
                ControlResult::Normal => {
                    self.command_index += 1;
                    break;
                }
                ControlResult::Continue => self.command_index += 1,
                ControlResult::ContinueAfterJump => {
                    // commands claiming a jump without making one still
                    // use up the budget
                    if self.jump_count == jumps {
                        self.jump_count += 1;
                    }
                    if self.jump_count > self.jump_budget {
                        trace!("{}: jump budget exhausted", script.name);
                        break;
                    }
                }
                ControlResult::Repeat => break,
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            command_index: self.command_index,
            current_labels: self
                .current_labels
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            heap: self
                .heap
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Whether the context is indistinguishable from a freshly created one.
    pub fn is_default(&self) -> bool {
        self.command_index == 0
            && self.heap.is_empty()
            && self.current_labels.values().all(|n| *n == 0)
    }

    /// Recreates a context from a snapshot. Labels the script doesn't know
    /// are dropped, counters are clamped to the number of occurrences.
    pub fn restore(script: Arc<Script>, snapshot: &ContextSnapshot) -> ExecutionContext {
        let mut ctx = ExecutionContext::new(script);
        ctx.command_index = snapshot.command_index;
        for (name, current) in &snapshot.current_labels {
            if let Some(positions) = ctx.script.label_indices.get(name) {
                let len = positions.len();
                ctx.current_labels
                    .insert(name.clone(), (*current).min(len));
            }
        }
        ctx.heap = snapshot
            .heap
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ctx
    }
}
