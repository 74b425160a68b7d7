//! PostgreSQL backend.
//!
//! Rosters live in `classroom_students`, whose `UNIQUE (student_id)` constraint
//! is the last line of the one-classroom-per-student rule. A violation is
//! translated into [`StoreError::StudentsAlreadyAssigned`] carrying the
//! conflicting ids.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use classhub_models::announcements::Announcement;
use classhub_models::assignments::Assignment;
use classhub_models::classrooms::Classroom;
use classhub_models::courses::Course;
use classhub_models::submissions::{StoredFile, Submission};
use classhub_models::{
    AnnouncementId, AssignmentId, ClassroomId, CourseId, Role, SubmissionId, User, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    AnnouncementChanges, AnnouncementStore, AssignmentChanges, AssignmentStore, ClassroomChanges,
    ClassroomStore, CourseChanges, CourseStore, NewAnnouncement, NewAssignment, NewClassroom,
    NewCourse, NewSubmission, NewUser, SubmissionStore, UserChanges, UserStore, dedup_students,
};

const USERS_EMAIL_KEY: &str = "users_email_key";
const ROSTER_STUDENT_UNIQUE: &str = "classroom_students_student_unique";
const SUBMISSION_UNIQUE: &str = "submissions_assignment_student_unique";

const USER_COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, name, description, teacher_id, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str =
    "id, title, description, due_date, file_url, classroom_id, created_by, created_at, updated_at";
const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, submission_text, submission_file, \
     original_file_name, file_size, submitted_at, grade, feedback, graded_at, graded_by, \
     created_at, updated_at";
const ANNOUNCEMENT_COLUMNS: &str =
    "id, title, message, classroom_id, created_by, created_at, updated_at";

/// Classroom rows with their roster aggregated in insertion order.
/// Callers append an optional `WHERE` and must finish with `GROUP BY c.id`.
const CLASSROOM_SELECT: &str = "SELECT c.id, c.name, c.course_id, c.teacher_id, \
     COALESCE(ARRAY_AGG(cs.student_id ORDER BY cs.position) \
     FILTER (WHERE cs.student_id IS NOT NULL), '{}') AS student_ids, \
     c.created_at, c.updated_at \
     FROM classrooms c LEFT JOIN classroom_students cs ON cs.classroom_id = c.id";

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn classroom_by_id(&self, id: ClassroomId) -> StoreResult<Option<Classroom>> {
        let sql = format!("{CLASSROOM_SELECT} WHERE c.id = $1 GROUP BY c.id");
        let classroom = sqlx::query_as::<_, Classroom>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(classroom)
    }

    /// Students in `candidates` currently held by any classroom other than `target`.
    async fn assigned_elsewhere(
        &self,
        candidates: &[UserId],
        target: Option<ClassroomId>,
    ) -> StoreResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT student_id FROM classroom_students \
             WHERE student_id = ANY($1) AND ($2::uuid IS NULL OR classroom_id <> $2)",
        )
        .bind(candidates)
        .bind(target)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Turns a roster constraint violation into the conflicting ids.
    async fn roster_failure(
        &self,
        err: sqlx::Error,
        candidates: &[UserId],
        target: Option<ClassroomId>,
    ) -> StoreError {
        if !violates(&err, ROSTER_STUDENT_UNIQUE) {
            return StoreError::Database(err);
        }
        match self.assigned_elsewhere(candidates, target).await {
            Ok(ids) => StoreError::StudentsAlreadyAssigned(ids),
            Err(e) => e,
        }
    }
}

/// Replaces a classroom's roster inside `tx`.
async fn write_roster(
    tx: &mut Transaction<'_, Postgres>,
    classroom: ClassroomId,
    students: &[UserId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM classroom_students WHERE classroom_id = $1")
        .bind(classroom)
        .execute(&mut **tx)
        .await?;

    if students.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO classroom_students (classroom_id, student_id, position) \
         SELECT $1, s.id, s.ord::int FROM UNNEST($2::uuid[]) WITH ORDINALITY AS s(id, ord)",
    )
    .bind(classroom)
    .bind(students)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password, role) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(UserId::new())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, USERS_EMAIL_KEY) {
                    StoreError::DuplicateEmail
                } else {
                    e.into()
                }
            })
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::user_role IS NULL OR role = $1) \
             ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                password = COALESCE($4, password), \
                role = COALESCE($5, role), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, USERS_EMAIL_KEY) {
                    StoreError::DuplicateEmail
                } else {
                    e.into()
                }
            })
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn insert_course(&self, course: NewCourse) -> StoreResult<Course> {
        let sql = format!(
            "INSERT INTO courses (id, name, description, teacher_id) VALUES ($1, $2, $3, $4) \
             RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(CourseId::new())
            .bind(&course.name)
            .bind(&course.description)
            .bind(course.teacher_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_courses(&self, ids: &[CourseId]) -> StoreResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at");
        Ok(sqlx::query_as::<_, Course>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_courses_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Course>> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE teacher_id = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(teacher)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> StoreResult<Option<Course>> {
        let (set_teacher, teacher) = match changes.teacher {
            Some(teacher) => (true, teacher),
            None => (false, None),
        };
        let sql = format!(
            "UPDATE courses SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                teacher_id = CASE WHEN $4 THEN $5 ELSE teacher_id END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(set_teacher)
            .bind(teacher)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_course(&self, id: CourseId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_course_teacher(&self, teacher: UserId) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE courses SET teacher_id = NULL, updated_at = NOW() WHERE teacher_id = $1",
        )
        .bind(teacher)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ClassroomStore for PgStore {
    #[instrument(skip(self, classroom), fields(name = %classroom.name))]
    async fn insert_classroom(&self, classroom: NewClassroom) -> StoreResult<Classroom> {
        let id = ClassroomId::new();
        let students = dedup_students(classroom.student_ids);

        let written: Result<(), sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            sqlx::query(
                "INSERT INTO classrooms (id, name, course_id, teacher_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&classroom.name)
            .bind(classroom.course_id)
            .bind(classroom.teacher_id)
            .execute(&mut *tx)
            .await?;
            write_roster(&mut tx, id, &students).await?;
            tx.commit().await
        }
        .await;

        if let Err(e) = written {
            return Err(self.roster_failure(e, &students, None).await);
        }

        self.classroom_by_id(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>> {
        self.classroom_by_id(id).await
    }

    async fn list_classrooms(&self) -> StoreResult<Vec<Classroom>> {
        let sql = format!("{CLASSROOM_SELECT} GROUP BY c.id ORDER BY c.created_at");
        Ok(sqlx::query_as::<_, Classroom>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_classrooms_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Classroom>> {
        let sql = format!(
            "{CLASSROOM_SELECT} WHERE c.teacher_id = $1 GROUP BY c.id ORDER BY c.created_at"
        );
        Ok(sqlx::query_as::<_, Classroom>(&sql)
            .bind(teacher)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_classrooms_by_student(&self, student: UserId) -> StoreResult<Vec<Classroom>> {
        let sql = format!(
            "{CLASSROOM_SELECT} WHERE c.id IN \
             (SELECT classroom_id FROM classroom_students WHERE student_id = $1) \
             GROUP BY c.id ORDER BY c.created_at"
        );
        Ok(sqlx::query_as::<_, Classroom>(&sql)
            .bind(student)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_classrooms_by_course(&self, course: CourseId) -> StoreResult<Vec<Classroom>> {
        let sql = format!(
            "{CLASSROOM_SELECT} WHERE c.course_id = $1 GROUP BY c.id ORDER BY c.created_at"
        );
        Ok(sqlx::query_as::<_, Classroom>(&sql)
            .bind(course)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_classrooms_holding(
        &self,
        students: &[UserId],
        excluding: Option<ClassroomId>,
    ) -> StoreResult<Vec<Classroom>> {
        if students.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{CLASSROOM_SELECT} WHERE c.id IN \
             (SELECT classroom_id FROM classroom_students WHERE student_id = ANY($1)) \
             AND ($2::uuid IS NULL OR c.id <> $2) \
             GROUP BY c.id ORDER BY c.created_at"
        );
        Ok(sqlx::query_as::<_, Classroom>(&sql)
            .bind(students)
            .bind(excluding)
            .fetch_all(&self.pool)
            .await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: ClassroomChanges,
    ) -> StoreResult<Option<Classroom>> {
        let (set_course, course) = match changes.course {
            Some(course) => (true, course),
            None => (false, None),
        };
        let (set_teacher, teacher) = match changes.teacher {
            Some(teacher) => (true, teacher),
            None => (false, None),
        };
        let students = changes.students.map(dedup_students);

        let written: Result<bool, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let updated = sqlx::query(
                "UPDATE classrooms SET \
                    name = COALESCE($2, name), \
                    course_id = CASE WHEN $3 THEN $4 ELSE course_id END, \
                    teacher_id = CASE WHEN $5 THEN $6 ELSE teacher_id END, \
                    updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&changes.name)
            .bind(set_course)
            .bind(course)
            .bind(set_teacher)
            .bind(teacher)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Ok(false);
            }
            if let Some(students) = &students {
                write_roster(&mut tx, id, students).await?;
            }
            tx.commit().await?;
            Ok(true)
        }
        .await;

        match written {
            Ok(true) => self.classroom_by_id(id).await,
            Ok(false) => Ok(None),
            Err(e) => Err(self
                .roster_failure(e, students.as_deref().unwrap_or_default(), Some(id))
                .await),
        }
    }

    #[instrument(skip(self))]
    async fn add_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>> {
        let inserted = sqlx::query(
            "INSERT INTO classroom_students (classroom_id, student_id, position) \
             SELECT c.id, $2, COALESCE((SELECT MAX(position) FROM classroom_students \
                                        WHERE classroom_id = c.id), 0) + 1 \
             FROM classrooms c WHERE c.id = $1 \
             ON CONFLICT (classroom_id, student_id) DO NOTHING",
        )
        .bind(id)
        .bind(student)
        .execute(&self.pool)
        .await;

        if let Err(e) = inserted {
            return Err(self.roster_failure(e, &[student], Some(id)).await);
        }

        sqlx::query("UPDATE classrooms SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.classroom_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn remove_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>> {
        let removed = sqlx::query(
            "DELETE FROM classroom_students WHERE classroom_id = $1 AND student_id = $2",
        )
        .bind(id)
        .bind(student)
        .execute(&self.pool)
        .await?;
        if removed.rows_affected() > 0 {
            sqlx::query("UPDATE classrooms SET updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        self.classroom_by_id(id).await
    }

    async fn delete_classroom(&self, id: ClassroomId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_classroom_teacher(&self, teacher: UserId) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE classrooms SET teacher_id = NULL, updated_at = NOW() WHERE teacher_id = $1",
        )
        .bind(teacher)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn clear_classroom_course(&self, course: CourseId) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE classrooms SET course_id = NULL, updated_at = NOW() WHERE course_id = $1",
        )
        .bind(course)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn pull_student_from_rosters(&self, student: UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM classroom_students WHERE student_id = $1")
            .bind(student)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AssignmentStore for PgStore {
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment> {
        let sql = format!(
            "INSERT INTO assignments (id, title, description, due_date, file_url, classroom_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ASSIGNMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(AssignmentId::new())
            .bind(&assignment.title)
            .bind(&assignment.description)
            .bind(assignment.due_date)
            .bind(&assignment.file_url)
            .bind(assignment.classroom_id)
            .bind(assignment.created_by)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1");
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_assignments(&self, ids: &[AssignmentId]) -> StoreResult<Vec<Assignment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY created_at");
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_assignments_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Assignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE classroom_id = $1 ORDER BY due_date ASC"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(classroom)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_assignments_by_creator(&self, creator: UserId) -> StoreResult<Vec<Assignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE created_by = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(creator)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        changes: AssignmentChanges,
    ) -> StoreResult<Option<Assignment>> {
        let sql = format!(
            "UPDATE assignments SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                due_date = COALESCE($4, due_date), \
                file_url = COALESCE($5, file_url), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {ASSIGNMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Assignment>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.due_date)
            .bind(changes.file_url)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_assignment(&self, id: AssignmentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    #[instrument(skip(self, submission), fields(assignment = %submission.assignment_id))]
    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission> {
        let sql = format!(
            "INSERT INTO submissions (id, assignment_id, student_id, submission_text, \
                submission_file, original_file_name, file_size) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SUBMISSION_COLUMNS}"
        );
        let file = submission.file.as_ref();
        sqlx::query_as::<_, Submission>(&sql)
            .bind(SubmissionId::new())
            .bind(submission.assignment_id)
            .bind(submission.student_id)
            .bind(&submission.submission_text)
            .bind(file.map(|f| f.key.clone()))
            .bind(file.map(|f| f.original_name.clone()))
            .bind(file.map(|f| f.size))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, SUBMISSION_UNIQUE) {
                    StoreError::DuplicateSubmission
                } else {
                    e.into()
                }
            })
    }

    async fn find_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>> {
        let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1");
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment: AssignmentId,
    ) -> StoreResult<Vec<Submission>> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = $1 \
             ORDER BY submitted_at DESC"
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(assignment)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_submissions_by_student(&self, student: UserId) -> StoreResult<Vec<Submission>> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE student_id = $1 \
             ORDER BY submitted_at DESC"
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(student)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_submissions_for_assignments(
        &self,
        assignments: &[AssignmentId],
    ) -> StoreResult<Vec<Submission>> {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let sql =
            format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = ANY($1)");
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(assignments)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn resubmit(
        &self,
        id: SubmissionId,
        submission_text: String,
        file: Option<StoredFile>,
    ) -> StoreResult<Option<Submission>> {
        let sql = format!(
            "UPDATE submissions SET \
                submission_text = $2, \
                submission_file = COALESCE($3, submission_file), \
                original_file_name = COALESCE($4, original_file_name), \
                file_size = COALESCE($5, file_size), \
                submitted_at = NOW(), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {SUBMISSION_COLUMNS}"
        );
        let file = file.as_ref();
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(&submission_text)
            .bind(file.map(|f| f.key.clone()))
            .bind(file.map(|f| f.original_name.clone()))
            .bind(file.map(|f| f.size))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn grade_submission(
        &self,
        id: SubmissionId,
        grade: String,
        feedback: String,
        graded_by: UserId,
    ) -> StoreResult<Option<Submission>> {
        let sql = format!(
            "UPDATE submissions SET grade = $2, feedback = $3, graded_by = $4, \
                graded_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {SUBMISSION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(&grade)
            .bind(&feedback)
            .bind(graded_by)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_submission(&self, id: SubmissionId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnnouncementStore for PgStore {
    async fn insert_announcement(
        &self,
        announcement: NewAnnouncement,
    ) -> StoreResult<Announcement> {
        let sql = format!(
            "INSERT INTO announcements (id, title, message, classroom_id, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(AnnouncementId::new())
            .bind(&announcement.title)
            .bind(&announcement.message)
            .bind(announcement.classroom_id)
            .bind(announcement.created_by)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_announcement(&self, id: AnnouncementId) -> StoreResult<Option<Announcement>> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = $1");
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let sql =
            format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_announcements_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Announcement>> {
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE classroom_id = $1 \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(classroom)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_announcement(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> StoreResult<Option<Announcement>> {
        let sql = format!(
            "UPDATE announcements SET \
                title = COALESCE($2, title), \
                message = COALESCE($3, message), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Announcement>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.message)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
