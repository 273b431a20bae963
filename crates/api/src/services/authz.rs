//! Permission and tenancy checks.
//!
//! Every mutating handler gates on a permission codename and, for
//! targeted operations, on the target belonging to the caller's NGO.
//! Platform accounts (users without an NGO) bypass both checks.

use uuid::Uuid;

use domain::models::user::User;
use domain::permissions::Permission;
use persistence::repositories::permission_group::PermissionGroupRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// Requires the caller to hold a permission through one of their groups.
pub async fn require_permission(
    state: &AppState,
    user: &User,
    permission: Permission,
) -> Result<(), ApiError> {
    if user.is_platform_user() {
        return Ok(());
    }

    let repo = PermissionGroupRepository::new(state.pool.clone());
    if repo.user_has_permission(user.id, permission.code()).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Missing permission: {}",
            permission.code()
        )))
    }
}

/// Requires the caller to be a platform account.
pub fn require_platform(user: &User) -> Result<(), ApiError> {
    if user.is_platform_user() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Platform administrator access required".to_string(),
        ))
    }
}

/// The NGO the caller operates in. Platform accounts have none and are
/// rejected on tenant-scoped collections.
pub fn require_ngo(user: &User) -> Result<Uuid, ApiError> {
    user.ngo_id.ok_or_else(|| {
        ApiError::Forbidden("This operation requires an NGO account".to_string())
    })
}

/// Ensures a target row belongs to the caller's NGO. Platform accounts
/// may touch any tenant.
pub fn check_same_ngo(caller: &User, target_ngo_id: Option<Uuid>) -> Result<(), ApiError> {
    if caller.is_platform_user() || caller.ngo_id == target_ngo_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Target belongs to a different NGO".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::user::{Language, UserRole};

    fn user(ngo_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            key: "a1b2c3d4e5".to_string(),
            first_name: "Asha".to_string(),
            middle_name: None,
            last_name: "Rao".to_string(),
            ngo_id,
            email: None,
            password_hash: None,
            role: UserRole::Admin,
            language: Language::English,
            is_active: true,
            must_reset_password: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_platform() {
        assert!(require_platform(&user(None)).is_ok());
        assert!(require_platform(&user(Some(Uuid::new_v4()))).is_err());
    }

    #[test]
    fn test_require_ngo() {
        let ngo = Uuid::new_v4();
        assert_eq!(require_ngo(&user(Some(ngo))).unwrap(), ngo);
        assert!(require_ngo(&user(None)).is_err());
    }

    #[test]
    fn test_check_same_ngo() {
        let ngo = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(check_same_ngo(&user(Some(ngo)), Some(ngo)).is_ok());
        assert!(check_same_ngo(&user(Some(ngo)), Some(other)).is_err());
        assert!(check_same_ngo(&user(Some(ngo)), None).is_err());
        // platform accounts reach into any tenant
        assert!(check_same_ngo(&user(None), Some(other)).is_ok());
    }
}
