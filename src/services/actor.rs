//! Actor service

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{Actor, ActorId, SYSTEM_ACTOR_NAME};
use crate::storage::Storage;

use super::record_audit;

/// Service for actor management
pub struct ActorService<'a> {
    storage: &'a Storage,
}

impl<'a> ActorService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn add(&self, name: &str) -> TallyResult<Actor> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::Validation("Actor name cannot be empty".into()));
        }
        if self.storage.actors.get_by_name(name)?.is_some() {
            return Err(TallyError::Duplicate {
                entity_type: "Actor",
                identifier: name.to_string(),
            });
        }

        let actor = Actor::new(name);
        self.save_new(&actor)?;
        Ok(actor)
    }

    pub fn get(&self, id: ActorId) -> TallyResult<Option<Actor>> {
        self.storage.actors.get(id)
    }

    /// Find an actor by name or ID string
    pub fn find(&self, identifier: &str) -> TallyResult<Option<Actor>> {
        if let Some(actor) = self.storage.actors.get_by_name(identifier)? {
            return Ok(Some(actor));
        }

        if let Ok(id) = identifier.trim().parse::<ActorId>() {
            return self.storage.actors.get(id);
        }

        let all = self.storage.actors.get_all()?;
        Ok(all.into_iter().find(|a| a.id.matches(identifier)))
    }

    pub fn resolve(&self, identifier: &str) -> TallyResult<Actor> {
        self.find(identifier)?
            .ok_or_else(|| TallyError::actor_not_found(identifier))
    }

    pub fn list(&self) -> TallyResult<Vec<Actor>> {
        self.storage.actors.get_all()
    }

    /// The System actor, created on first use
    ///
    /// Call once at startup and pass the result to whatever records
    /// opening balances.
    pub fn ensure_system_actor(&self) -> TallyResult<Actor> {
        if let Some(actor) = self.storage.actors.get_by_name(SYSTEM_ACTOR_NAME)? {
            return Ok(actor);
        }

        let actor = Actor::system();
        self.save_new(&actor)?;
        Ok(actor)
    }

    fn save_new(&self, actor: &Actor) -> TallyResult<()> {
        self.storage.actors.upsert(actor.clone())?;
        self.storage.actors.save()?;

        record_audit(
            self.storage,
            &[AuditEntry::create(
                EntityType::Actor,
                actor.id.to_string(),
                Some(actor.name.clone()),
                actor,
            )],
        );
        Ok(())
    }
}
