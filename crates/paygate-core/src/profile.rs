//! Profile Service
//!
//! Reads and writes the caller's profile through the actor and keeps the
//! cached copy the view resolver depends on.

use std::sync::Arc;

use crate::actor::{ActorContext, UserProfile};
use crate::cache::{QueryCache, QueryKey};
use crate::error::{GateError, Result};
use crate::view::{ProfileSlot, ProfileState};

/// Trimmed display name, `None` when nothing but whitespace was entered
pub fn draft_profile(name: &str) -> Option<UserProfile> {
    let name = name.trim();
    (!name.is_empty()).then(|| UserProfile::new(name))
}

/// Profile reads and writes backed by the shared [`QueryCache`]
#[derive(Clone)]
pub struct ProfileService {
    cache: Arc<QueryCache>,
}

impl ProfileService {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    /// Fetch the caller's profile and cache the result.
    ///
    /// Without an actor nothing is fetched and the cache is left untouched.
    /// A read overtaken by a newer fetch, an invalidation or a logout fails
    /// with [`GateError::Superseded`] so its result is never acted upon.
    pub async fn fetch(&self, ctx: &ActorContext) -> Result<Option<UserProfile>> {
        let actor = ctx.actor()?;
        let ticket = self.cache.begin(QueryKey::CurrentUserProfile);

        match actor.get_caller_user_profile().await {
            Ok(profile) => {
                if self.cache.complete(ticket, profile.clone()) {
                    Ok(profile)
                } else {
                    Err(GateError::Superseded)
                }
            }
            Err(e) => {
                if self.cache.fail(ticket) {
                    tracing::warn!(error = %e, "failed to fetch caller profile");
                }
                Err(e)
            }
        }
    }

    /// Fetch only when nothing usable is cached (never fetched, failed or
    /// invalidated) and an actor is ready
    pub async fn refresh(&self, ctx: &ActorContext) -> Result<()> {
        if ctx.is_ready() && self.cache.needs_fetch(QueryKey::CurrentUserProfile) {
            match self.fetch(ctx).await {
                Ok(_) | Err(GateError::Superseded) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Save the profile, then invalidate the cached copy so the next
    /// resolution sees a fresh read
    pub async fn save(&self, ctx: &ActorContext, profile: &UserProfile) -> Result<()> {
        let actor = ctx.actor()?;

        if let Err(e) = actor.save_caller_user_profile(profile).await {
            tracing::error!(error = %e, "failed to save profile");
            return Err(e);
        }

        self.cache.invalidate(QueryKey::CurrentUserProfile);
        Ok(())
    }

    /// Profile state as the view resolver consumes it
    pub fn state(&self, ctx: &ActorContext) -> ProfileState {
        let snap = self
            .cache
            .snapshot::<Option<UserProfile>>(QueryKey::CurrentUserProfile);

        ProfileState {
            loading: ctx.is_fetching() || snap.is_loading(),
            fetched: ctx.actor().is_ok() && snap.fetched,
            value: snap.value.map_or(ProfileSlot::Unknown, ProfileSlot::from),
        }
    }

    /// Cached profile, if one is known to exist
    pub fn current(&self) -> Option<UserProfile> {
        self.cache
            .get::<Option<UserProfile>>(QueryKey::CurrentUserProfile)
            .flatten()
    }
}
