//! Profile fields and profile pictures.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use yv_models::{ProfileUpdate, User};
use yv_pipeline::safe_extension;
use yv_storage::{guess_content_type, Container, ObjectStore};
use yv_store::Store;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    pub async fn profile(&self, user_id: &str) -> ApiResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> ApiResult<User> {
        let update = ProfileUpdate {
            first_name: update.first_name.trim().to_string(),
            last_name: update.last_name.trim().to_string(),
            bio: update.bio.trim().to_string(),
        };
        update.validate()?;
        Ok(self.store.update_profile(user_id, &update).await?)
    }

    /// Store a new picture, point the profile at it and drop the old one.
    pub async fn set_picture(
        &self,
        user_id: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> ApiResult<User> {
        if data.is_empty() {
            return Err(ApiError::validation("Picture is empty"));
        }
        let name = format!("{}{}", Uuid::new_v4(), safe_extension(file_name, ".jpg"));
        let content_type = guess_content_type(&name);
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation("Profile picture must be an image"));
        }

        let url = self
            .objects
            .put(Container::Profiles, &name, data, &content_type)
            .await?;
        let previous = match self.store.set_profile_picture(user_id, &url).await {
            Ok(previous) => previous,
            Err(e) => {
                if let Err(cleanup) = self.objects.delete(&url).await {
                    warn!(url, error = %cleanup, "Failed to delete unused picture");
                }
                return Err(e.into());
            }
        };
        if let Some(old) = previous {
            if let Err(e) = self.objects.delete(&old).await {
                warn!(url = %old, error = %e, "Failed to delete old profile picture");
            }
        }
        info!(user_id, "Profile picture updated");
        self.profile(user_id).await
    }
}
