//! Pure lifecycle transitions for application records.
//!
//! Purge is deliberately unreachable from `Active`: an irreversible delete
//! always takes the explicit trash-then-purge two-step.

use super::domain::ApplicationStatus;

/// Illegal transition attempt; nothing about the record changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} an application in state {from}")]
pub struct LifecycleError {
    pub from: ApplicationStatus,
    pub action: &'static str,
}

pub fn activate(from: ApplicationStatus) -> Result<ApplicationStatus, LifecycleError> {
    match from {
        ApplicationStatus::Lead => Ok(ApplicationStatus::Active),
        other => Err(LifecycleError {
            from: other,
            action: "activate",
        }),
    }
}

pub fn trash(from: ApplicationStatus) -> Result<ApplicationStatus, LifecycleError> {
    match from {
        ApplicationStatus::Lead | ApplicationStatus::Active => Ok(ApplicationStatus::Trashed),
        other => Err(LifecycleError {
            from: other,
            action: "trash",
        }),
    }
}

pub fn restore(from: ApplicationStatus) -> Result<ApplicationStatus, LifecycleError> {
    match from {
        ApplicationStatus::Trashed => Ok(ApplicationStatus::Active),
        other => Err(LifecycleError {
            from: other,
            action: "restore",
        }),
    }
}

pub fn purge(from: ApplicationStatus) -> Result<ApplicationStatus, LifecycleError> {
    match from {
        ApplicationStatus::Trashed => Ok(ApplicationStatus::Purged),
        other => Err(LifecycleError {
            from: other,
            action: "purge",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn leads_activate_and_nothing_else_does() {
        assert_eq!(activate(Lead), Ok(Active));
        for state in [Active, Trashed, Purged] {
            assert!(activate(state).is_err());
        }
    }

    #[test]
    fn trash_applies_to_leads_and_active_records() {
        assert_eq!(trash(Lead), Ok(Trashed));
        assert_eq!(trash(Active), Ok(Trashed));
        assert!(trash(Trashed).is_err());
        assert!(trash(Purged).is_err());
    }

    #[test]
    fn restore_requires_a_trashed_record() {
        assert_eq!(restore(Trashed), Ok(Active));
        assert!(restore(Active).is_err());
        assert!(restore(Purged).is_err());
    }

    #[test]
    fn purge_is_only_reachable_from_trashed() {
        assert_eq!(purge(Trashed), Ok(Purged));
        let err = purge(Active).unwrap_err();
        assert_eq!(err.from, Active);
        assert_eq!(err.action, "purge");
        assert!(purge(Lead).is_err());
        assert!(purge(Purged).is_err());
    }
}
