//! Roster validation.
//!
//! Checks run fail-fast in a fixed order and never write:
//!
//! 1. every id parses, else [`RosterError::InvalidId`]
//! 2. every id resolves to a user, else [`RosterError::StudentsNotFound`] with all misses
//! 3. every user is a student, else [`RosterError::NotStudents`]
//! 4. no classroom other than the target holds a candidate, else [`RosterError::AlreadyAssigned`]

use std::collections::HashSet;
use std::str::FromStr;

use classhub_db::{ClassroomStore, Store, UserStore, dedup_students};
use classhub_models::{ClassroomId, Role, UserId};
use tracing::instrument;

use crate::error::{RosterError, RosterResult};

/// Parses a client-supplied id, naming the raw value on failure.
pub fn parse_id<T: FromStr>(raw: &str) -> RosterResult<T> {
    raw.parse::<T>()
        .map_err(|_| RosterError::InvalidId(raw.to_string()))
}

/// Parses candidate student ids, keeping the first occurrence of each.
pub fn parse_student_ids(raw: &[String]) -> RosterResult<Vec<UserId>> {
    let ids = raw
        .iter()
        .map(|id| parse_id::<UserId>(id))
        .collect::<RosterResult<Vec<_>>>()?;
    Ok(dedup_students(ids))
}

pub struct RosterValidator<'a> {
    store: &'a dyn Store,
}

impl<'a> RosterValidator<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validates assigning `candidates` to `target` (`None` while creating).
    ///
    /// Returns the parsed, deduplicated ids in their original order.
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub async fn validate_students(
        &self,
        candidates: &[String],
        target: Option<ClassroomId>,
    ) -> RosterResult<Vec<UserId>> {
        let ids = parse_student_ids(candidates)?;
        self.check_students(&ids, target).await?;
        Ok(ids)
    }

    /// Steps 2 to 4 for ids that already parsed.
    pub async fn check_students(
        &self,
        ids: &[UserId],
        target: Option<ClassroomId>,
    ) -> RosterResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let users = self.store.find_users(ids).await?;

        let found: HashSet<UserId> = users.iter().map(|u| u.id).collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RosterError::StudentsNotFound(missing));
        }

        let not_students: HashSet<UserId> = users
            .iter()
            .filter(|u| u.role != Role::Student)
            .map(|u| u.id)
            .collect();
        if !not_students.is_empty() {
            return Err(RosterError::NotStudents(
                ids.iter().filter(|id| not_students.contains(id)).copied().collect(),
            ));
        }

        let holders = self.store.find_classrooms_holding(ids, target).await?;
        let held: HashSet<UserId> = holders
            .iter()
            .flat_map(|c| c.student_ids.iter().copied())
            .collect();
        let conflicting: Vec<UserId> = ids.iter().filter(|id| held.contains(id)).copied().collect();
        if !conflicting.is_empty() {
            tracing::warn!(conflicting = ?conflicting, "Roster exclusivity violation rejected");
            return Err(RosterError::AlreadyAssigned(conflicting));
        }

        Ok(())
    }

    /// Resolves a teacher reference; the user must exist with role teacher.
    pub async fn validate_teacher(&self, raw: &str) -> RosterResult<UserId> {
        let id = parse_id::<UserId>(raw)?;
        match self.store.find_user(id).await? {
            Some(user) if user.role == Role::Teacher => Ok(id),
            _ => Err(RosterError::NotTeacher(raw.to_string())),
        }
    }
}
