//! Typed permission catalog.
//!
//! Permissions are identified by stable codenames (`add_user`,
//! `change_measurement`, ...) which is also how they are persisted and
//! exchanged over the API. Grants live in permission groups; a group is
//! always scoped to one NGO through its `ngo_id` column.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every permission the API can grant or check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    // users
    AddUser,
    ChangeUser,
    DeleteUser,
    ViewUser,
    CanImport,
    CanExport,
    // admins
    AddAdmin,
    ChangeAdmin,
    DeleteAdmin,
    ViewAdmin,
    // athletes
    AddAthlete,
    ChangeAthlete,
    DeleteAthlete,
    ViewAthlete,
    // coaches
    AddCoach,
    ChangeCoach,
    DeleteCoach,
    ViewCoach,
    // ngos
    AddNgo,
    ChangeNgo,
    DeleteNgo,
    ViewNgo,
    // measurements
    AddMeasurement,
    ChangeMeasurement,
    DeleteMeasurement,
    ViewMeasurement,
    // measurement types
    AddMeasurementType,
    ChangeMeasurementType,
    DeleteMeasurementType,
    ViewMeasurementType,
    // resources
    AddResource,
    ChangeResource,
    DeleteResource,
    ViewResource,
    // curricula
    AddCurriculum,
    ChangeCurriculum,
    DeleteCurriculum,
    ViewCurriculum,
    // files
    AddFile,
    ChangeFile,
    DeleteFile,
    ViewFile,
    // training sessions
    AddTrainingSession,
    ChangeTrainingSession,
    DeleteTrainingSession,
    ViewTrainingSession,
    // custom user groups
    AddCustomUserGroup,
    ChangeCustomUserGroup,
    DeleteCustomUserGroup,
    ViewCustomUserGroup,
    // permission groups
    AddPermissionGroup,
    ChangePermissionGroup,
    DeletePermissionGroup,
    ViewPermissionGroup,
    // platform-level administration
    PlatformAdmin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl Permission {
    /// Stable codename used in the database and over the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Permission::AddUser => "add_user",
            Permission::ChangeUser => "change_user",
            Permission::DeleteUser => "delete_user",
            Permission::ViewUser => "view_user",
            Permission::CanImport => "can_import",
            Permission::CanExport => "can_export",
            Permission::AddAdmin => "add_admin",
            Permission::ChangeAdmin => "change_admin",
            Permission::DeleteAdmin => "delete_admin",
            Permission::ViewAdmin => "view_admin",
            Permission::AddAthlete => "add_athlete",
            Permission::ChangeAthlete => "change_athlete",
            Permission::DeleteAthlete => "delete_athlete",
            Permission::ViewAthlete => "view_athlete",
            Permission::AddCoach => "add_coach",
            Permission::ChangeCoach => "change_coach",
            Permission::DeleteCoach => "delete_coach",
            Permission::ViewCoach => "view_coach",
            Permission::AddNgo => "add_ngo",
            Permission::ChangeNgo => "change_ngo",
            Permission::DeleteNgo => "delete_ngo",
            Permission::ViewNgo => "view_ngo",
            Permission::AddMeasurement => "add_measurement",
            Permission::ChangeMeasurement => "change_measurement",
            Permission::DeleteMeasurement => "delete_measurement",
            Permission::ViewMeasurement => "view_measurement",
            Permission::AddMeasurementType => "add_measurementtype",
            Permission::ChangeMeasurementType => "change_measurementtype",
            Permission::DeleteMeasurementType => "delete_measurementtype",
            Permission::ViewMeasurementType => "view_measurementtype",
            Permission::AddResource => "add_resource",
            Permission::ChangeResource => "change_resource",
            Permission::DeleteResource => "delete_resource",
            Permission::ViewResource => "view_resource",
            Permission::AddCurriculum => "add_curriculum",
            Permission::ChangeCurriculum => "change_curriculum",
            Permission::DeleteCurriculum => "delete_curriculum",
            Permission::ViewCurriculum => "view_curriculum",
            Permission::AddFile => "add_file",
            Permission::ChangeFile => "change_file",
            Permission::DeleteFile => "delete_file",
            Permission::ViewFile => "view_file",
            Permission::AddTrainingSession => "add_trainingsession",
            Permission::ChangeTrainingSession => "change_trainingsession",
            Permission::DeleteTrainingSession => "delete_trainingsession",
            Permission::ViewTrainingSession => "view_trainingsession",
            Permission::AddCustomUserGroup => "add_customusergroup",
            Permission::ChangeCustomUserGroup => "change_customusergroup",
            Permission::DeleteCustomUserGroup => "delete_customusergroup",
            Permission::ViewCustomUserGroup => "view_customusergroup",
            Permission::AddPermissionGroup => "add_permissiongroup",
            Permission::ChangePermissionGroup => "change_permissiongroup",
            Permission::DeletePermissionGroup => "delete_permissiongroup",
            Permission::ViewPermissionGroup => "view_permissiongroup",
            Permission::PlatformAdmin => "platform_admin",
        }
    }

    /// Human-readable label shown in permission pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Permission::AddUser => "Can add user",
            Permission::ChangeUser => "Can change user",
            Permission::DeleteUser => "Can delete user",
            Permission::ViewUser => "Can view user",
            Permission::CanImport => "Can import users",
            Permission::CanExport => "Can export users",
            Permission::AddAdmin => "Can add admin",
            Permission::ChangeAdmin => "Can change admin",
            Permission::DeleteAdmin => "Can delete admin",
            Permission::ViewAdmin => "Can view admin",
            Permission::AddAthlete => "Can add athlete",
            Permission::ChangeAthlete => "Can change athlete",
            Permission::DeleteAthlete => "Can delete athlete",
            Permission::ViewAthlete => "Can view athlete",
            Permission::AddCoach => "Can add coach",
            Permission::ChangeCoach => "Can change coach",
            Permission::DeleteCoach => "Can delete coach",
            Permission::ViewCoach => "Can view coach",
            Permission::AddNgo => "Can add ngo",
            Permission::ChangeNgo => "Can change ngo",
            Permission::DeleteNgo => "Can delete ngo",
            Permission::ViewNgo => "Can view ngo",
            Permission::AddMeasurement => "Can add measurement",
            Permission::ChangeMeasurement => "Can change measurement",
            Permission::DeleteMeasurement => "Can delete measurement",
            Permission::ViewMeasurement => "Can view measurement",
            Permission::AddMeasurementType => "Can add measurement type",
            Permission::ChangeMeasurementType => "Can change measurement type",
            Permission::DeleteMeasurementType => "Can delete measurement type",
            Permission::ViewMeasurementType => "Can view measurement type",
            Permission::AddResource => "Can add resource",
            Permission::ChangeResource => "Can change resource",
            Permission::DeleteResource => "Can delete resource",
            Permission::ViewResource => "Can view resource",
            Permission::AddCurriculum => "Can add curriculum",
            Permission::ChangeCurriculum => "Can change curriculum",
            Permission::DeleteCurriculum => "Can delete curriculum",
            Permission::ViewCurriculum => "Can view curriculum",
            Permission::AddFile => "Can add file",
            Permission::ChangeFile => "Can change file",
            Permission::DeleteFile => "Can delete file",
            Permission::ViewFile => "Can view file",
            Permission::AddTrainingSession => "Can add session",
            Permission::ChangeTrainingSession => "Can change session",
            Permission::DeleteTrainingSession => "Can delete session",
            Permission::ViewTrainingSession => "Can view session",
            Permission::AddCustomUserGroup => "Can add custom user group",
            Permission::ChangeCustomUserGroup => "Can change custom user group",
            Permission::DeleteCustomUserGroup => "Can delete custom user group",
            Permission::ViewCustomUserGroup => "Can view custom user group",
            Permission::AddPermissionGroup => "Can add permission group",
            Permission::ChangePermissionGroup => "Can change permission group",
            Permission::DeletePermissionGroup => "Can delete permission group",
            Permission::ViewPermissionGroup => "Can view permission group",
            Permission::PlatformAdmin => "Platform admin",
        }
    }

    /// The full grantable catalog.
    pub fn all() -> &'static [Permission] {
        &ALL_PERMISSIONS
    }
}

const ALL_PERMISSIONS: [Permission; 55] = [
    Permission::AddUser,
    Permission::ChangeUser,
    Permission::DeleteUser,
    Permission::ViewUser,
    Permission::CanImport,
    Permission::CanExport,
    Permission::AddAdmin,
    Permission::ChangeAdmin,
    Permission::DeleteAdmin,
    Permission::ViewAdmin,
    Permission::AddAthlete,
    Permission::ChangeAthlete,
    Permission::DeleteAthlete,
    Permission::ViewAthlete,
    Permission::AddCoach,
    Permission::ChangeCoach,
    Permission::DeleteCoach,
    Permission::ViewCoach,
    Permission::AddNgo,
    Permission::ChangeNgo,
    Permission::DeleteNgo,
    Permission::ViewNgo,
    Permission::AddMeasurement,
    Permission::ChangeMeasurement,
    Permission::DeleteMeasurement,
    Permission::ViewMeasurement,
    Permission::AddMeasurementType,
    Permission::ChangeMeasurementType,
    Permission::DeleteMeasurementType,
    Permission::ViewMeasurementType,
    Permission::AddResource,
    Permission::ChangeResource,
    Permission::DeleteResource,
    Permission::ViewResource,
    Permission::AddCurriculum,
    Permission::ChangeCurriculum,
    Permission::DeleteCurriculum,
    Permission::ViewCurriculum,
    Permission::AddFile,
    Permission::ChangeFile,
    Permission::DeleteFile,
    Permission::ViewFile,
    Permission::AddTrainingSession,
    Permission::ChangeTrainingSession,
    Permission::DeleteTrainingSession,
    Permission::ViewTrainingSession,
    Permission::AddCustomUserGroup,
    Permission::ChangeCustomUserGroup,
    Permission::DeleteCustomUserGroup,
    Permission::ViewCustomUserGroup,
    Permission::AddPermissionGroup,
    Permission::ChangePermissionGroup,
    Permission::DeletePermissionGroup,
    Permission::ViewPermissionGroup,
    Permission::PlatformAdmin,
];

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PERMISSIONS
            .iter()
            .find(|p| p.code() == s)
            .copied()
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Codenames that can never be granted or revoked through the API.
///
/// Covers the internal bookkeeping tables (auth tokens, sessions, password
/// resets) plus raw permission rows themselves.
pub const PERMISSION_BLACKLIST: &[&str] = &[
    "add_permission",
    "change_permission",
    "delete_permission",
    "view_permission",
    "add_authtoken",
    "change_authtoken",
    "delete_authtoken",
    "view_authtoken",
    "add_session",
    "change_session",
    "delete_session",
    "view_session",
    "add_userresetpassword",
    "change_userresetpassword",
    "delete_userresetpassword",
    "view_userresetpassword",
];

/// Whether a codename is blocked from grant/revoke operations.
pub fn is_blacklisted(code: &str) -> bool {
    PERMISSION_BLACKLIST.contains(&code)
}

/// Grant set assigned to the admin group created at NGO bootstrap.
pub fn default_admin_permissions() -> Vec<Permission> {
    use Permission::*;
    vec![
        AddMeasurement,
        ChangeMeasurement,
        DeleteMeasurement,
        ViewMeasurement,
        AddMeasurementType,
        ChangeMeasurementType,
        DeleteMeasurementType,
        ViewMeasurementType,
        AddResource,
        ChangeResource,
        DeleteResource,
        ViewResource,
        AddCurriculum,
        ChangeCurriculum,
        DeleteCurriculum,
        ViewCurriculum,
        AddFile,
        ChangeFile,
        DeleteFile,
        ViewFile,
        AddTrainingSession,
        ChangeTrainingSession,
        DeleteTrainingSession,
        ViewTrainingSession,
        AddCoach,
        ChangeCoach,
        DeleteCoach,
        ViewCoach,
        AddAthlete,
        ChangeAthlete,
        DeleteAthlete,
        ViewAthlete,
        AddAdmin,
        ChangeAdmin,
        DeleteAdmin,
        ViewAdmin,
        AddCustomUserGroup,
        ChangeCustomUserGroup,
        DeleteCustomUserGroup,
        ViewCustomUserGroup,
        AddPermissionGroup,
        ChangePermissionGroup,
        DeletePermissionGroup,
        ViewPermissionGroup,
    ]
}

/// Grant set assigned to the coach group created at NGO bootstrap.
pub fn default_coach_permissions() -> Vec<Permission> {
    Vec::new()
}

/// Catalog entry returned by the permission listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionInfo {
    pub code: &'static str,
    pub label: &'static str,
}

/// Grantable catalog for permission pickers.
pub fn grantable_catalog() -> Vec<PermissionInfo> {
    Permission::all()
        .iter()
        .filter(|p| !is_blacklisted(p.code()))
        .map(|p| PermissionInfo {
            code: p.code(),
            label: p.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips() {
        for p in Permission::all() {
            assert_eq!(p.code().parse::<Permission>().unwrap(), *p);
        }
    }

    #[test]
    fn test_unknown_codename() {
        let err = "walk_dog".parse::<Permission>().unwrap_err();
        assert_eq!(err, UnknownPermission("walk_dog".to_string()));
    }

    #[test]
    fn test_serde_uses_codenames() {
        assert_eq!(
            serde_json::to_string(&Permission::AddMeasurementType).unwrap(),
            "\"add_measurementtype\""
        );
        let p: Permission = serde_json::from_str("\"change_trainingsession\"").unwrap();
        assert_eq!(p, Permission::ChangeTrainingSession);
    }

    #[test]
    fn test_serde_rejects_unknown() {
        assert!(serde_json::from_str::<Permission>("\"add_logentry\"").is_err());
    }

    #[test]
    fn test_blacklist() {
        assert!(is_blacklisted("add_permission"));
        assert!(is_blacklisted("view_session"));
        assert!(!is_blacklisted("add_user"));
    }

    #[test]
    fn test_default_admin_set() {
        let set = default_admin_permissions();
        assert!(set.contains(&Permission::AddPermissionGroup));
        assert!(set.contains(&Permission::ViewAthlete));
        // platform and ngo administration never come from bootstrap
        assert!(!set.contains(&Permission::PlatformAdmin));
        assert!(!set.contains(&Permission::AddNgo));
        // no blacklisted codename can appear in a default set
        assert!(set.iter().all(|p| !is_blacklisted(p.code())));
    }

    #[test]
    fn test_default_coach_set_is_empty() {
        assert!(default_coach_permissions().is_empty());
    }

    #[test]
    fn test_catalog_excludes_nothing_grantable() {
        let catalog = grantable_catalog();
        assert_eq!(catalog.len(), Permission::all().len());
        assert!(catalog.iter().any(|p| p.code == "can_import"));
    }
}
