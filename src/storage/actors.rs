//! Actor repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{Actor, ActorId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ActorData {
    actors: Vec<Actor>,
}

/// Repository for actor persistence
pub struct ActorRepository {
    path: PathBuf,
    data: RwLock<HashMap<ActorId, Actor>>,
}

impl ActorRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: ActorData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for actor in file_data.actors {
            data.insert(actor.id, actor);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), TallyError> {
        let data = read_lock(&self.data)?;

        let mut actors: Vec<_> = data.values().cloned().collect();
        actors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &ActorData { actors })
    }

    pub fn get(&self, id: ActorId) -> Result<Option<Actor>, TallyError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All actors, oldest first
    pub fn get_all(&self) -> Result<Vec<Actor>, TallyError> {
        let data = read_lock(&self.data)?;

        let mut actors: Vec<_> = data.values().cloned().collect();
        actors.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(actors)
    }

    /// Get an actor by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Actor>, TallyError> {
        let data = read_lock(&self.data)?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|a| a.name.to_lowercase() == name_lower)
            .cloned())
    }

    pub fn upsert(&self, actor: Actor) -> Result<(), TallyError> {
        write_lock(&self.data)?.insert(actor.id, actor);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, TallyError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actors.json");
        let repo = ActorRepository::new(path.clone());

        let actor = Actor::new("Reza");
        let id = actor.id;
        repo.upsert(actor).unwrap();
        repo.upsert(Actor::system()).unwrap();
        repo.save().unwrap();

        let repo2 = ActorRepository::new(path);
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 2);
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "Reza");
        assert!(repo2.get_by_name("system").unwrap().unwrap().is_system());
    }
}
