use crate::request::RequestStatus;

/// Input failed a rule before anything touched the store. Messages are
/// user-facing and name the violated constraint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("user is not authenticated")]
    NotAuthenticated,
    #[error("select a product")]
    ProductRequired,
    #[error("amount must be between $250,000 and $500,000,000")]
    AmountOutOfRange,
    #[error("amount must be greater than zero")]
    AmountNotPositive,
    #[error("amount must not exceed $500,000,000")]
    AmountAboveCeiling,
    #[error("select a term")]
    TermRequired,
    #[error("{0} months is not an allowed term")]
    TermNotAllowed(u32),
    #[error("\"{0}\" is not a valid request status")]
    UnknownStatus(String),
}

/// Actor lacks the role or ownership the mutation requires. Detected
/// locally, the operation aborts before any partial state change.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("only the owner or an administrator can modify this request")]
    NotOwner,
    #[error("request cannot be edited while {0}")]
    EditLocked(RequestStatus),
    #[error("only a draft request can be deleted, current status is {0}")]
    DeleteLocked(RequestStatus),
    #[error("administrator role is required for this action")]
    AdminOnly,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("request {0} does not exist")]
    RequestNotFound(String),
    #[error("user {0} does not exist")]
    UserNotFound(String),
}
