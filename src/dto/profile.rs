//! DTO definitions for the player profile endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::ProfileEntity, dto::format_system_time};

/// Payload ensuring a profile exists for a signed-in player.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InitProfileRequest {
    /// Email of the authenticated player, used as identifier.
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Payload updating the mutable parts of a profile.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name; whitespace-only names are rejected.
    pub display_name: Option<String>,
    /// New avatar reference.
    pub avatar: Option<String>,
}

/// Projection of a stored player profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileSnapshot {
    pub player_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ProfileEntity> for ProfileSnapshot {
    fn from(profile: &ProfileEntity) -> Self {
        Self {
            player_id: profile.player_id.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            avatar: profile.avatar.clone(),
            created_at: format_system_time(profile.created_at),
            updated_at: format_system_time(profile.updated_at),
        }
    }
}
