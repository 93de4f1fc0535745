//! Board, the local host for script-owning entities.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use id_pool::IdPool;

use crate::config::EngineConfig;
use crate::entity::Entity;
use crate::error::Error;
use crate::machine::exec::ExecutionContext;
use crate::machine::script::{Grammar, Script};
use crate::snapshot::{EntitySnapshot, Snapshot, SnapshotMetadata};
use crate::{EntityId, Result};

/// Collection of entities advanced together, one tick per step.
///
/// # Example
///
/// ```ignore
/// let mut board = zzscript_core::Board::default();
/// let script = board.compile("door", ":touch\nSay \"locked\"\n").unwrap();
/// let door = board.spawn("door", Some(script)).unwrap();
/// board.send(door, "touch").unwrap();
/// board.step().unwrap();
/// ```
pub struct Board {
    pub config: EngineConfig,
    /// Number of steps that have been processed so far
    clock: usize,
    /// Entities, stepped in order of their ids
    entities: BTreeMap<EntityId, Entity>,
    /// Pool of integer identifiers for entities
    entity_pool: IdPool,
}

impl Default for Board {
    fn default() -> Self {
        Board::new(EngineConfig::default())
    }
}

impl Board {
    pub fn new(config: EngineConfig) -> Board {
        Board {
            config,
            clock: 0,
            entities: BTreeMap::new(),
            entity_pool: IdPool::new(),
        }
    }

    pub fn clock(&self) -> usize {
        self.clock
    }

    /// Compiles a script using the board's grammar settings.
    pub fn compile(&self, name: &str, source: &str) -> Result<Arc<Script>> {
        let grammar = Grammar::new(self.config.case_sensitive_keywords);
        Ok(Arc::new(Script::compile_with(name, source, &grammar)?))
    }

    /// Spawns a new entity, optionally running the given script.
    pub fn spawn(&mut self, name: &str, script: Option<Arc<Script>>) -> Result<EntityId> {
        let id = self
            .entity_pool
            .request_id()
            .ok_or(Error::RequestIdError)?;
        let context = script.map(|s| self.new_context(s));
        debug!("spawned entity {} ({})", id, name);
        self.entities.insert(id, Entity::new(id, name, context));
        Ok(id)
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<Entity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(Error::FailedGettingEntityById(id))?;
        self.entity_pool
            .return_id(id)
            .map_err(|_| Error::ReturnIdError)?;
        debug!("despawned entity {} ({})", id, entity.name);
        Ok(entity)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Finds the first entity with the given name.
    pub fn find(&self, name: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.name == name)
    }

    /// Queues a message for a single entity.
    pub fn send(&mut self, id: EntityId, label: &str) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(Error::FailedGettingEntityById(id))?;
        entity.send(label);
        Ok(())
    }

    /// Queues a message for every entity.
    pub fn broadcast(&mut self, label: &str) {
        for entity in self.entities.values_mut() {
            entity.send(label);
        }
    }

    /// Advances every entity by one tick.
    ///
    /// Script errors are not recoverable, the first one aborts the step and
    /// gets returned. Entities later in order don't tick in that case.
    pub fn step(&mut self) -> Result<()> {
        for entity in self.entities.values_mut() {
            if let Err(e) = entity.tick() {
                error!("entity {} ({}) failed: {}", entity.id, entity.name, e);
                return Err(e.into());
            }
        }
        self.clock += 1;
        trace!("finished step {}", self.clock);
        Ok(())
    }

    fn new_context(&self, script: Arc<Script>) -> ExecutionContext {
        ExecutionContext::new(script).with_jump_budget(self.config.jump_budget)
    }
}

/// Snapshots.
impl Board {
    /// Captures the current state. Contexts in default state are left out.
    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .entities
            .values()
            .map(|entity| {
                let context = entity.context.as_ref();
                EntitySnapshot {
                    id: entity.id,
                    name: entity.name.clone(),
                    locked: entity.locked,
                    script: context.map(|c| c.script().name.clone()),
                    context: context
                        .filter(|c| !c.is_default())
                        .map(|c| c.snapshot()),
                    messages: context
                        .map(|c| c.messages().iter().cloned().collect())
                        .unwrap_or_default(),
                }
            })
            .collect();
        Snapshot {
            metadata: SnapshotMetadata {
                created: Utc::now(),
            },
            clock: self.clock,
            config: self.config.clone(),
            entity_pool: self.entity_pool.clone(),
            entities,
        }
    }

    /// Recreates a board from a snapshot.
    ///
    /// Scripts are looked up by name among the provided ones, a missing
    /// script is an error.
    pub fn from_snapshot(snapshot: Snapshot, scripts: &[Arc<Script>]) -> Result<Board> {
        let mut board = Board {
            config: snapshot.config,
            clock: snapshot.clock,
            entities: BTreeMap::new(),
            entity_pool: snapshot.entity_pool,
        };
        for saved in snapshot.entities {
            let context = match &saved.script {
                Some(name) => {
                    let script = scripts
                        .iter()
                        .find(|s| &s.name == name)
                        .cloned()
                        .ok_or_else(|| Error::NoScript(name.clone()))?;
                    let mut context = match &saved.context {
                        Some(state) => ExecutionContext::restore(script, state)
                            .with_jump_budget(board.config.jump_budget),
                        None => board.new_context(script),
                    };
                    for message in &saved.messages {
                        context.send(message);
                    }
                    Some(context)
                }
                None => None,
            };
            let mut entity = Entity::new(saved.id, &saved.name, context);
            entity.locked = saved.locked;
            board.entities.insert(saved.id, entity);
        }
        debug!(
            "restored board at clock {} with {} entities",
            board.clock,
            board.entities.len()
        );
        Ok(board)
    }

    /// Serializes the current state using the configured compression.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.snapshot().to_bytes(self.config.compress_snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::ErrorKind;
    use crate::var::Var;

    #[test]
    fn step_ticks_entities_in_id_order() {
        let mut board = Board::default();
        let script = board.compile("hello", "Say \"hi\"\nEnd\n").unwrap();
        let a = board.spawn("a", Some(script.clone())).unwrap();
        let b = board.spawn("b", Some(script)).unwrap();
        let rock = board.spawn("rock", None).unwrap();
        assert!(a < b && b < rock);

        board.step().unwrap();
        assert_eq!(board.clock(), 1);
        assert_eq!(board.entity(a).unwrap().output, vec!["hi"]);
        assert_eq!(board.entity(b).unwrap().output, vec!["hi"]);
        assert!(board.entity(rock).unwrap().output.is_empty());
    }

    #[test]
    fn messages_reach_labels() {
        let mut board = Board::default();
        let script = board
            .compile("door", "End\n:touch\nSay \"locked\"\nEnd\n")
            .unwrap();
        let door = board.spawn("door", Some(script)).unwrap();
        board.step().unwrap();
        assert!(!board.entity(door).unwrap().is_running());

        board.send(door, "touch").unwrap();
        board.step().unwrap();
        assert_eq!(board.entity(door).unwrap().output, vec!["locked"]);

        board.broadcast("touch");
        board.step().unwrap();
        assert_eq!(board.entity(door).unwrap().output.len(), 2);
        assert!(board.send(door + 100, "touch").is_err());
    }

    #[test]
    fn first_error_aborts_step() {
        let mut board = Board::default();
        let good = board.compile("good", "Set 1 x\nIdle\n").unwrap();
        let bad = board.compile("bad", "Give 1 name\n").unwrap();
        let first = board.spawn("first", Some(bad)).unwrap();
        let second = board.spawn("second", Some(good)).unwrap();
        if let Some(ctx) = board.entity_mut(first).and_then(|e| e.context.as_mut()) {
            ctx.set_var("name", Var::Str("bob".to_string()));
        }

        match board.step() {
            Err(Error::MachineError(e)) => {
                assert_eq!(e.location().source.as_deref(), Some("bad"));
                assert!(match e.kind() {
                    ErrorKind::Other(_) => true,
                    _ => false,
                });
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert_eq!(board.clock(), 0);
        let untouched = board.entity(second).unwrap().context.as_ref().unwrap();
        assert!(untouched.is_default());
    }

    #[test]
    fn despawn_frees_entity() {
        let mut board = Board::default();
        let id = board.spawn("ghost", None).unwrap();
        let ghost = board.despawn(id).unwrap();
        assert_eq!(ghost.name, "ghost");
        assert!(board.entity(id).is_none());
        assert!(board.despawn(id).is_err());
    }

    #[test]
    fn jump_budget_comes_from_config() {
        let config = EngineConfig {
            jump_budget: 1,
            ..EngineConfig::default()
        };
        let mut board = Board::new(config);
        let script = board
            .compile("pingpong", ":a\nGive 1 hops\nSend b\n:b\nGive 1 hops\nSend a\n")
            .unwrap();
        let id = board.spawn("pingpong", Some(script)).unwrap();
        board.step().unwrap();
        let ctx = board.entity(id).unwrap().context.as_ref().unwrap();
        assert_eq!(ctx.get_var("hops"), Some(&Var::Int(2)));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut board = Board::default();
        let source = ":loop\nGive 1 n\nSay \"tick\"\nSend loop\n:poke\nSay \"ouch\"\nSend loop\n";
        let script = board.compile("counter", source).unwrap();
        let idle = board.compile("idle", "Idle\n").unwrap();
        let counter = board.spawn("counter", Some(script.clone())).unwrap();
        let sleeper = board.spawn("sleeper", Some(idle.clone())).unwrap();
        board.spawn("rock", None).unwrap();
        board.step().unwrap();
        board.step().unwrap();
        board.send(counter, "poke").unwrap();

        let snapshot = board.snapshot();
        let saved = snapshot.entities.iter().find(|e| e.id == sleeper).unwrap();
        assert!(saved.context.is_some());
        let saved = snapshot.entities.iter().find(|e| e.id == counter).unwrap();
        assert_eq!(saved.messages, vec!["poke"]);

        let bytes = board.to_bytes().unwrap();
        let decoded = Snapshot::from_bytes(&bytes).unwrap();
        let mut restored = Board::from_snapshot(decoded, &[script, idle]).unwrap();
        assert_eq!(restored.clock(), 2);

        for _ in 0..3 {
            board.step().unwrap();
            restored.step().unwrap();
        }
        let original = board.entity(counter).unwrap();
        let copy = restored.entity(counter).unwrap();
        assert_eq!(copy.output, vec!["ouch", "tick", "tick"]);
        assert_eq!(
            original.output[original.output.len() - 3..].to_vec(),
            copy.output
        );
        assert_eq!(
            original.context.as_ref().unwrap().snapshot(),
            copy.context.as_ref().unwrap().snapshot()
        );
    }

    #[test]
    fn default_contexts_are_omitted() {
        let mut board = Board::default();
        let script = board.compile("fresh", "Idle\n").unwrap();
        let id = board.spawn("fresh", Some(script)).unwrap();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.entities[0].id, id);
        assert_eq!(snapshot.entities[0].script.as_deref(), Some("fresh"));
        assert!(snapshot.entities[0].context.is_none());
    }

    #[test]
    fn restore_requires_scripts() {
        let mut board = Board::default();
        let script = board.compile("lost", "Idle\n").unwrap();
        board.spawn("lost", Some(script)).unwrap();
        match Board::from_snapshot(board.snapshot(), &[]) {
            Err(Error::NoScript(name)) => assert_eq!(name, "lost"),
            _ => panic!("expected missing script error"),
        }
    }
}
