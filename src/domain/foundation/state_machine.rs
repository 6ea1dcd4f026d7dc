//! Declared transitions for lifecycle enums.

use super::ValidationError;

/// A status enum with an explicit transition table.
///
/// ```ignore
/// let next = ConnectionState::Disconnected.transition_to(ConnectionState::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("{self:?} -> {target:?} is not a legal transition"),
            ))
        }
    }
}
