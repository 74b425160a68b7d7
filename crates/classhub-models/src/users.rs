use chrono::{DateTime, Utc};
use classhub_core::permissions;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::classrooms::ClassroomView;
use crate::courses::CourseView;
use crate::ids::UserId;

/// The single role a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Capabilities granted to every holder of this role.
    pub fn permissions(&self) -> Vec<String> {
        let granted: &[&str] = match self {
            Role::Admin => permissions::ALL,
            Role::Teacher => &[
                permissions::USERS_READ,
                permissions::COURSES_READ,
                permissions::CLASSROOMS_READ,
                permissions::ASSIGNMENTS_READ,
                permissions::ASSIGNMENTS_WRITE,
                permissions::ANNOUNCEMENTS_READ,
                permissions::ANNOUNCEMENTS_WRITE,
                permissions::SUBMISSIONS_READ,
                permissions::SUBMISSIONS_GRADE,
                permissions::SUBMISSIONS_DELETE,
            ],
            Role::Student => &[
                permissions::COURSES_READ,
                permissions::CLASSROOMS_READ,
                permissions::ASSIGNMENTS_READ,
                permissions::ANNOUNCEMENTS_READ,
                permissions::SUBMISSIONS_SUBMIT,
            ],
        };
        granted.iter().map(|p| p.to_string()).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!(
                "role must be one of admin, teacher, student (got '{}')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal user reference embedded in populated views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
}

fn redact(password: &Option<String>) -> Option<&'static str> {
    password.as_ref().map(|_| "[redacted]")
}

impl std::fmt::Debug for CreateUserDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserDto")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .finish()
    }
}

impl std::fmt::Debug for UpdateUserDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserDto")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .field("role", &self.role)
            .finish()
    }
}

impl std::fmt::Debug for UpdateProfileDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateProfileDto")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserFilterParams {
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersEnvelope {
    pub users: Vec<User>,
}

/// A user together with what they teach or attend.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<CourseView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classrooms: Option<Vec<ClassroomView>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!(Role::Student.to_string(), "student");
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        let role: Role = serde_json::from_str(r#""student""#).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_admin_has_every_permission() {
        let granted = Role::Admin.permissions();
        for p in permissions::ALL {
            assert!(granted.iter().any(|g| g == p), "admin missing {}", p);
        }
    }

    #[test]
    fn test_student_cannot_write_classrooms_or_grade() {
        let granted = Role::Student.permissions();
        assert!(granted.contains(&permissions::SUBMISSIONS_SUBMIT.to_string()));
        assert!(!granted.contains(&permissions::CLASSROOMS_WRITE.to_string()));
        assert!(!granted.contains(&permissions::SUBMISSIONS_GRADE.to_string()));
    }

    #[test]
    fn test_teacher_grades_but_does_not_manage_rosters() {
        let granted = Role::Teacher.permissions();
        assert!(granted.contains(&permissions::SUBMISSIONS_GRADE.to_string()));
        assert!(!granted.contains(&permissions::CLASSROOMS_MANAGE_ROSTER.to_string()));
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let user = User {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret-hash".to_string(),
            role: Role::Teacher,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "teacher");
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: Role::Student,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_password_dtos_redact_debug_output() {
        let create = CreateUserDto {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2-plaintext".to_string(),
            role: Role::Teacher,
        };
        let update = UpdateUserDto {
            password: Some("hunter2-plaintext".to_string()),
            ..Default::default()
        };
        let profile = UpdateProfileDto {
            password: Some("hunter2-plaintext".to_string()),
            ..Default::default()
        };

        for rendered in [format!("{create:?}"), format!("{update:?}"), format!("{profile:?}")] {
            assert!(!rendered.contains("hunter2-plaintext"), "{rendered}");
            assert!(rendered.contains("[redacted]"), "{rendered}");
        }
        assert!(format!("{:?}", UpdateProfileDto::default()).contains("password: None"));
    }
}
