//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user::{Language, User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Admin,
    Coach,
    Athlete,
}

impl From<UserRoleDb> for UserRole {
    fn from(db: UserRoleDb) -> Self {
        match db {
            UserRoleDb::Admin => Self::Admin,
            UserRoleDb::Coach => Self::Coach,
            UserRoleDb::Athlete => Self::Athlete,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Coach => Self::Coach,
            UserRole::Athlete => Self::Athlete,
        }
    }
}

/// Database enum for user_language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_language")]
pub enum LanguageDb {
    #[sqlx(rename = "en_IN")]
    English,
    #[sqlx(rename = "hi_IN")]
    Hindi,
    #[sqlx(rename = "ka_IN")]
    Kannada,
}

impl From<LanguageDb> for Language {
    fn from(db: LanguageDb) -> Self {
        match db {
            LanguageDb::English => Self::English,
            LanguageDb::Hindi => Self::Hindi,
            LanguageDb::Kannada => Self::Kannada,
        }
    }
}

impl From<Language> for LanguageDb {
    fn from(language: Language) -> Self {
        match language {
            Language::English => Self::English,
            Language::Hindi => Self::Hindi,
            Language::Kannada => Self::Kannada,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub key: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub ngo_id: Option<Uuid>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: UserRoleDb,
    pub language: LanguageDb,
    pub is_active: bool,
    pub must_reset_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            first_name: entity.first_name,
            middle_name: entity.middle_name,
            last_name: entity.last_name,
            ngo_id: entity.ngo_id,
            email: entity.email,
            password_hash: entity.password_hash,
            role: entity.role.into(),
            language: entity.language.into(),
            is_active: entity.is_active,
            must_reset_password: entity.must_reset_password,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Column list shared by every user query.
pub const USER_COLUMNS: &str = "id, key, first_name, middle_name, last_name, ngo_id, email, \
     password_hash, role, language, is_active, must_reset_password, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(UserRole::from(UserRoleDb::Coach), UserRole::Coach);
        assert_eq!(UserRoleDb::from(UserRole::Athlete), UserRoleDb::Athlete);
    }

    #[test]
    fn test_language_conversion() {
        assert_eq!(Language::from(LanguageDb::Hindi), Language::Hindi);
        assert_eq!(LanguageDb::from(Language::Kannada), LanguageDb::Kannada);
    }
}
