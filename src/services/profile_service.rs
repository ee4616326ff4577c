//! Player profile lookups and lazy initialisation.

use std::time::SystemTime;

use tracing::info;

use crate::{
    dao::models::ProfileEntity,
    dto::profile::{ProfileSnapshot, UpdateProfileRequest},
    error::ServiceError,
    state::SharedState,
};

/// Ensure a profile exists for the given account email, creating one with
/// defaults on first sight. Racing creations write identical defaults, so
/// last write wins harmlessly.
pub async fn init_profile(
    state: &SharedState,
    email: &str,
) -> Result<ProfileSnapshot, ServiceError> {
    let store = state.require_room_store().await?;

    if let Some(existing) = store.find_profile(email.to_owned()).await? {
        return Ok(ProfileSnapshot::from(&existing));
    }

    let display_name = email
        .split('@')
        .next()
        .filter(|part| !part.is_empty())
        .unwrap_or(email)
        .to_owned();

    let now = SystemTime::now();
    let profile = ProfileEntity {
        player_id: email.to_owned(),
        email: email.to_owned(),
        display_name,
        avatar: None,
        created_at: now,
        updated_at: now,
    };

    store.save_profile(profile.clone()).await?;
    info!(player = email, "profile initialised");
    Ok(ProfileSnapshot::from(&profile))
}

/// Fetch a profile by player identifier.
pub async fn get_profile(
    state: &SharedState,
    player_id: &str,
) -> Result<ProfileSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let profile = store
        .find_profile(player_id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{player_id}` not found")))?;
    Ok(ProfileSnapshot::from(&profile))
}

/// Update the mutable parts of a profile.
pub async fn update_profile(
    state: &SharedState,
    player_id: &str,
    request: UpdateProfileRequest,
) -> Result<ProfileSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let mut profile = store
        .find_profile(player_id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{player_id}` not found")))?;

    if let Some(display_name) = request.display_name {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidInput(
                "display_name must not be empty".into(),
            ));
        }
        profile.display_name = trimmed.to_owned();
    }
    if let Some(avatar) = request.avatar {
        profile.avatar = Some(avatar);
    }
    profile.updated_at = SystemTime::now();

    store.save_profile(profile.clone()).await?;
    Ok(ProfileSnapshot::from(&profile))
}
