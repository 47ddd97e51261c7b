//! Storage initialization
//!
//! Handles first-run setup: directories and the System actor that owns
//! opening-balance entries.

use crate::config::paths::TallyPaths;
use crate::error::TallyError;
use crate::models::{Actor, SYSTEM_ACTOR_NAME};

use super::actors::ActorRepository;

/// Initialize storage for a fresh installation
///
/// Returns the System actor, creating it if this is the first run. Calling
/// it again on an initialized directory changes nothing.
pub fn initialize_storage(paths: &TallyPaths) -> Result<Actor, TallyError> {
    paths.ensure_directories()?;

    let actors = ActorRepository::new(paths.actors_file());
    actors.load()?;

    if let Some(existing) = actors.get_by_name(SYSTEM_ACTOR_NAME)? {
        return Ok(existing);
    }

    let system = Actor::system();
    actors.upsert(system.clone())?;
    actors.save()?;

    Ok(system)
}
