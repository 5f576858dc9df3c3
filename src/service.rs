//! Service layer API for term deposit request operations
use std::collections::HashMap;
use std::sync::Arc;

use crate::actor::{self, Actor, AuditStamp, UserProfile};
use crate::cache::OwnerCache;
use crate::error::StoreError;
use crate::interest::InterestBasis;
use crate::request::{self, CdtRequest, RequestDraft, RequestStatus, TermMonths, TimeStamp};
use crate::utils;

/// Pending changes for an update. `None` fields are left untouched.
/// A status override is admin-only.
#[derive(Debug, Default, Clone)]
pub struct RequestChanges {
    pub amount: Option<u64>,
    pub term: Option<TermMonths>,
    pub status: Option<RequestStatus>,
}

/// A request annotated with its owner's display name, for the admin
/// all-requests view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRequest {
    pub owner_name: String,
    pub request: CdtRequest,
}

pub struct CdtService {
    instance: Arc<sled::Db>,
    profiles: sled::Tree,
    requests: sled::Tree,
    cache: OwnerCache,
    basis: InterestBasis,
}

impl CdtService {
    pub fn new(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        Self::with_basis(instance, InterestBasis::default())
    }

    /// Same as [`CdtService::new`] but with an explicit interest basis,
    /// for reproducing projections of records written under the other
    /// formula.
    pub fn with_basis(instance: Arc<sled::Db>, basis: InterestBasis) -> anyhow::Result<Self> {
        Ok(Self {
            profiles: instance.open_tree("usuarios")?,
            requests: instance.open_tree("solicitudes")?,
            instance,
            cache: OwnerCache::new(),
            basis,
        })
    }

    /// Block until everything written so far is durable on disk.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.instance.flush()?;
        Ok(())
    }

    fn request_key(owner_id: &str, request_id: &str) -> String {
        format!("{owner_id}/{request_id}")
    }

    /// Load one request document from the store
    fn load_request(&self, owner_id: &str, request_id: &str) -> anyhow::Result<CdtRequest> {
        let key = Self::request_key(owner_id, request_id);
        let raw = self
            .requests
            .get(key.as_bytes())?
            .ok_or_else(|| StoreError::RequestNotFound(request_id.to_string()))?;

        Ok(minicbor::decode(&raw)?)
    }

    fn persist(&self, request: &CdtRequest) -> anyhow::Result<()> {
        let key = Self::request_key(&request.owner_id, &request.id);
        self.requests
            .insert(key.as_bytes(), minicbor::to_vec(request)?)?;
        // only forget the cached listing once the write stuck, so local
        // state never runs ahead of the store
        self.cache.invalidate(&request.owner_id);
        Ok(())
    }

    /// Create the caller's profile document on first contact, or refresh
    /// its `last_seen` on later ones. Returns whether the profile is new.
    pub fn ensure_profile(&self, actor: &Actor) -> anyhow::Result<bool> {
        match self.profiles.get(actor.uid.as_bytes())? {
            Some(raw) => {
                let mut profile: UserProfile = minicbor::decode(&raw)?;
                profile.last_seen = TimeStamp::new();
                self.profiles
                    .insert(actor.uid.as_bytes(), minicbor::to_vec(&profile)?)?;
                Ok(false)
            }
            None => {
                let now = TimeStamp::new();
                let profile = UserProfile {
                    uid: actor.uid.clone(),
                    email: actor.email.clone(),
                    display_name: if actor.display_name.is_empty() {
                        "Usuario".to_string()
                    } else {
                        actor.display_name.clone()
                    },
                    role: actor.role,
                    created_at: now.clone(),
                    last_seen: now,
                };
                self.profiles
                    .insert(actor.uid.as_bytes(), minicbor::to_vec(&profile)?)?;
                Ok(true)
            }
        }
    }

    pub fn get_profile(&self, uid: &str) -> anyhow::Result<UserProfile> {
        let raw = self
            .profiles
            .get(uid.as_bytes())?
            .ok_or_else(|| StoreError::UserNotFound(uid.to_string()))?;

        Ok(minicbor::decode(&raw)?)
    }

    /// Submit a new request. Validates the draft, derives the rate from
    /// the term, projects the interest and persists the document in the
    /// initial draft state.
    pub fn create_request(&self, actor: &Actor, draft: RequestDraft) -> anyhow::Result<CdtRequest> {
        let valid = draft.validate(actor)?;

        // the profile document must exist before any request hangs off it
        self.ensure_profile(actor)?;

        let now = TimeStamp::new();
        let mut request = CdtRequest {
            id: utils::new_uuid_to_bech32("cdt")?,
            owner_id: actor.uid.clone(),
            product: valid.product,
            amount: valid.amount,
            term: valid.term,
            annual_rate_bps: valid.annual_rate_bps,
            status: RequestStatus::Draft,
            estimated_interest: None,
            maturity_value: None,
            created_at: now.clone(),
            updated_at: now,
            audit: None,
        };
        request.reproject(self.basis);

        self.persist(&request)?;

        Ok(request)
    }

    /// Apply changes to an existing request. The owner may do this while
    /// the request is still editable, an admin at any time. Derived
    /// fields are recomputed when the amount or term moved; a term change
    /// re-derives the rate.
    pub fn update_request(
        &self,
        actor: &Actor,
        owner_id: &str,
        request_id: &str,
        changes: RequestChanges,
    ) -> anyhow::Result<CdtRequest> {
        let mut request = self.load_request(owner_id, request_id)?;

        actor::authorize_edit(actor, &request)?;
        if changes.status.is_some() {
            actor::require_admin(actor)?;
        }

        let mut financials_changed = false;
        if let Some(amount) = changes.amount {
            request::check_amount(amount, actor.role)?;
            if amount != request.amount {
                request.amount = amount;
                financials_changed = true;
            }
        }
        if let Some(term) = changes.term {
            if term != request.term {
                request.term = term;
                request.annual_rate_bps = term.annual_rate_bps();
                financials_changed = true;
            }
        }
        if let Some(status) = changes.status {
            request.status = status;
        }

        if financials_changed {
            request.reproject(self.basis);
        }
        request.updated_at = TimeStamp::new();
        // the stamp describes the latest mutation only
        request.audit = AuditStamp::of(actor);

        self.persist(&request)?;

        Ok(request)
    }

    /// Set a request's status directly. Admin-only; any target status is
    /// reachable from any current one, and repeating the same target is a
    /// permitted no-op that still advances `updated_at`.
    pub fn change_status(
        &self,
        actor: &Actor,
        owner_id: &str,
        request_id: &str,
        new_status: RequestStatus,
    ) -> anyhow::Result<CdtRequest> {
        actor::require_admin(actor)?;

        let mut request = self.load_request(owner_id, request_id)?;

        request.status = new_status;
        request.updated_at = TimeStamp::new();
        request.audit = AuditStamp::of(actor);

        self.persist(&request)?;

        Ok(request)
    }

    /// Remove a request permanently. Owners may only remove their own
    /// drafts, admins anything.
    pub fn delete_request(
        &self,
        actor: &Actor,
        owner_id: &str,
        request_id: &str,
    ) -> anyhow::Result<()> {
        let request = self.load_request(owner_id, request_id)?;

        actor::authorize_delete(actor, &request)?;

        self.requests
            .remove(Self::request_key(owner_id, request_id).as_bytes())?;
        self.cache.invalidate(owner_id);

        Ok(())
    }

    pub fn get_request(&self, owner_id: &str, request_id: &str) -> anyhow::Result<CdtRequest> {
        self.load_request(owner_id, request_id)
    }

    /// All requests of one owner, newest first. Served from the owner
    /// cache when a previous read populated it.
    pub fn list_requests(&self, owner_id: &str) -> anyhow::Result<Vec<CdtRequest>> {
        if let Some(cached) = self.cache.get(owner_id) {
            return Ok(cached);
        }

        let prefix = format!("{owner_id}/");
        let mut rows = Vec::new();
        for item in self.requests.scan_prefix(prefix.as_bytes()) {
            let (_, raw) = item?;
            rows.push(minicbor::decode::<CdtRequest>(&raw)?);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.cache.store(owner_id, rows.clone());
        Ok(rows)
    }

    /// All requests across all owners, each annotated with the owner's
    /// display name. Admin-only view.
    pub fn list_all_requests(&self, actor: &Actor) -> anyhow::Result<Vec<OwnedRequest>> {
        actor::require_admin(actor)?;

        // resolve display names first, then walk every request document
        let mut names: HashMap<String, String> = HashMap::new();
        for item in self.profiles.iter() {
            let (_, raw) = item?;
            let profile: UserProfile = minicbor::decode(&raw)?;
            names.insert(profile.uid, profile.display_name);
        }

        let mut rows = Vec::new();
        for item in self.requests.iter() {
            let (_, raw) = item?;
            let request: CdtRequest = minicbor::decode(&raw)?;
            let owner_name = names
                .get(&request.owner_id)
                .cloned()
                .unwrap_or_else(|| "Usuario".to_string());
            rows.push(OwnedRequest {
                owner_name,
                request,
            });
        }
        rows.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));

        Ok(rows)
    }
}
