//! Cache Generation Lifecycle
//!
//! State machine for a single cache generation. A generation is one
//! version-stamped store moving through install, activation, and deletion;
//! it never reactivates.

use alloc::string::String;

use crate::PolicyError;

/// Cache generation states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Not yet installed
    Uninstalled,
    /// Manifest fetches in flight
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Active and serving routed requests
    Active,
    /// Replaced by a newer generation, store pending deletion
    Superseded,
    /// Install failed; nothing was committed
    Discarded,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::Uninstalled
    }
}

/// Check if a state transition is valid
pub fn is_valid_transition(from: GenerationState, to: GenerationState) -> bool {
    use GenerationState::*;

    matches!(
        (from, to),
        (Uninstalled, Installing)
            | (Installing, Installed)
            | (Installing, Discarded) // install failed
            | (Installed, Active)
            | (Active, Superseded) // replaced by a newer generation
    )
}

/// One cache generation: a version-stamped store name plus its state.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Store name for this generation
    name: String,
    /// Current state
    state: GenerationState,
}

impl Generation {
    /// Create a new, uninstalled generation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: GenerationState::Uninstalled,
        }
    }

    /// Get the store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current state
    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Move to the next state, validating the edge
    pub fn advance(&mut self, next: GenerationState) -> Result<(), PolicyError> {
        if !is_valid_transition(self.state, next) {
            return Err(PolicyError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
