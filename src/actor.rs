//! Actor identity, stored user profiles and the authorization policy
//!
//! Every mutating service operation consults this module instead of
//! repeating its own role and ownership checks.
use chrono::Utc;

use crate::error::PermissionError;
use crate::request::{CdtRequest, TimeStamp};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[n(0)]
    Client,
    #[n(1)]
    Admin,
}

/// The authenticated caller of a service operation, as delivered by the
/// identity provider. An empty `uid` means the session never signed in.
#[derive(Debug, Clone)]
pub struct Actor {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    pub fn client(uid: &str, display_name: &str) -> Self {
        Self {
            uid: uid.to_string(),
            email: String::new(),
            display_name: display_name.to_string(),
            role: Role::Client,
        }
    }
    pub fn admin(uid: &str, display_name: &str) -> Self {
        Self {
            uid: uid.to_string(),
            email: String::new(),
            display_name: display_name.to_string(),
            role: Role::Admin,
        }
    }
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Who performed the last mutation, kept only when that was an admin.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    #[n(0)]
    pub admin_id: String,
    #[n(1)]
    pub admin_name: String,
}

impl AuditStamp {
    /// Stamp for this actor, `None` for non-admins.
    pub fn of(actor: &Actor) -> Option<Self> {
        actor.is_admin().then(|| Self {
            admin_id: actor.uid.clone(),
            admin_name: actor.display_name.clone(),
        })
    }
}

/// Per-user profile document, created lazily on the first write and
/// touched on later ones.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    #[n(0)]
    pub uid: String,
    #[n(1)]
    pub email: String,
    #[n(2)]
    pub display_name: String,
    #[n(3)]
    pub role: Role,
    #[n(4)]
    pub created_at: TimeStamp<Utc>,
    #[n(5)]
    pub last_seen: TimeStamp<Utc>,
}

/// Can this actor edit the request right now? Admins always can; the
/// owner only while the request has not left the editable states.
pub fn authorize_edit(actor: &Actor, request: &CdtRequest) -> Result<(), PermissionError> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.uid != request.owner_id {
        return Err(PermissionError::NotOwner);
    }
    if !request.status.client_editable() {
        return Err(PermissionError::EditLocked(request.status));
    }
    Ok(())
}

/// Deletion is unconditional for admins, draft-only for the owner.
pub fn authorize_delete(actor: &Actor, request: &CdtRequest) -> Result<(), PermissionError> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.uid != request.owner_id {
        return Err(PermissionError::NotOwner);
    }
    if !request.status.client_deletable() {
        return Err(PermissionError::DeleteLocked(request.status));
    }
    Ok(())
}

pub fn require_admin(actor: &Actor) -> Result<(), PermissionError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PermissionError::AdminOnly)
    }
}
