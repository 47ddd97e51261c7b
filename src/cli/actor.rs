//! Actor CLI commands

use clap::Subcommand;

use crate::error::TallyResult;
use crate::services::ActorService;
use crate::storage::Storage;

/// Actor subcommands
#[derive(Subcommand)]
pub enum ActorCommands {
    /// Add a person who records entries
    Add {
        /// Actor name
        name: String,
    },
    /// List actors
    List,
}

pub fn handle_actor_command(storage: &Storage, cmd: ActorCommands) -> TallyResult<()> {
    let service = ActorService::new(storage);

    match cmd {
        ActorCommands::Add { name } => {
            let actor = service.add(&name)?;
            println!("Added actor: {}", actor.name);
            println!("  ID: {}", actor.id);
        }
        ActorCommands::List => {
            let actors = service.list()?;
            if actors.is_empty() {
                println!("No actors found.");
            }
            for actor in actors {
                println!("{:<12}  {}", actor.id.to_string(), actor.name);
            }
        }
    }

    Ok(())
}
