//! Actor model
//!
//! The person responsible for an entry. Opening balances are recorded by the
//! well-known "System" actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ActorId;

/// Name of the actor that records opening balances
pub const SYSTEM_ACTOR_NAME: &str = "System";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_ACTOR_NAME)
    }

    pub fn is_system(&self) -> bool {
        self.name == SYSTEM_ACTOR_NAME
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
