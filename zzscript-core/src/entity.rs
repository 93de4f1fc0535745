//! Script-owning entity.

use crate::machine::exec::ExecutionContext;
use crate::machine::{self, Owner};
use crate::EntityId;

/// Basic building block of the board state.
///
/// Entities without a script are inert, they only take up an id.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Locked entities don't react to messages
    pub locked: bool,
    /// Lines displayed by the entity's script, oldest first
    pub output: Vec<String>,
    pub context: Option<ExecutionContext>,
}

impl Entity {
    pub fn new(id: EntityId, name: &str, context: Option<ExecutionContext>) -> Entity {
        Entity {
            id,
            name: name.to_string(),
            locked: false,
            output: Vec::new(),
            context,
        }
    }

    /// Queues a message for the entity's script.
    pub fn send(&mut self, message: &str) {
        if let Some(context) = &mut self.context {
            context.send(message);
        }
    }

    pub fn is_running(&self) -> bool {
        self.context.as_ref().map_or(false, |c| c.is_running())
    }

    /// Advances the entity's script by one tick.
    pub fn tick(&mut self) -> machine::Result<()> {
        // the context is taken out so that it can borrow the entity as owner
        let mut context = match self.context.take() {
            Some(context) => context,
            None => return Ok(()),
        };
        let result = context.tick(self);
        self.context = Some(context);
        result
    }
}

impl Owner for Entity {
    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        trace!("entity {} ({}) locked: {}", self.id, self.name, locked);
        self.locked = locked;
    }

    fn say(&mut self, text: &str) {
        info!("{}: {}", self.name, text);
        self.output.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::script::Script;
    use std::sync::Arc;

    fn entity(source: &str) -> Entity {
        let script = Script::compile("npc", source).unwrap();
        Entity::new(1, "npc", Some(ExecutionContext::new(Arc::new(script))))
    }

    #[test]
    fn tick_keeps_context() {
        let mut npc = entity("Say \"hello\"\nLock\nEnd\n");
        npc.tick().unwrap();
        assert_eq!(npc.output, vec!["hello"]);
        assert!(npc.is_running());
        npc.tick().unwrap();
        assert!(npc.locked);
        assert!(!npc.is_running());
        assert!(npc.context.is_some());
    }

    #[test]
    fn inert_entity_ticks_fine() {
        let mut rock = Entity::new(2, "rock", None);
        rock.send("touch");
        rock.tick().unwrap();
        assert!(!rock.is_running());
    }

    #[test]
    fn extern_commands_are_ignored_by_default() {
        let mut npc = entity("#dance 3\nSay \"done\"\n");
        npc.tick().unwrap();
        assert!(npc.output.is_empty());
        npc.tick().unwrap();
        assert_eq!(npc.output, vec!["done"]);
    }
}
