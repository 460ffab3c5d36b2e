//! Authorization gate for event operations.
//!
//! A pure decision function over `(actor, action, resource owner)` so the
//! same matrix is applied by every mutation path. Callers must have already
//! resolved the actor; anonymous access never reaches this point.

use crate::error::EventError;
use crate::models::{Actor, Role};
use uuid::Uuid;

/// The operations the gate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Create,
    Read,
    Update,
    Cancel,
    Delete,
}

/// Decide whether `actor` may perform `action` on the event owned by
/// `owner` (`None` when the action has no target yet, i.e. create).
///
/// | Action               | Admin | Owner | Other authenticated |
/// |----------------------|-------|-------|---------------------|
/// | create               | allow | allow | allow               |
/// | read                 | allow | allow | allow               |
/// | update/cancel/delete | allow | allow | deny                |
pub fn authorize(
    actor: &Actor,
    action: EventAction,
    owner: Option<&Uuid>,
) -> Result<(), EventError> {
    match action {
        EventAction::Create | EventAction::Read => Ok(()),
        EventAction::Update | EventAction::Cancel | EventAction::Delete => match actor.role {
            Role::Admin => Ok(()),
            Role::Organizer | Role::Customer => {
                if owner.is_some_and(|owner| *owner == actor.id) {
                    Ok(())
                } else {
                    Err(EventError::forbidden(
                        "You do not have permission to modify this event",
                    ))
                }
            }
        },
    }
}
