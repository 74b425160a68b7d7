//! Populating stored entities into response views.
//!
//! Referenced rows are fetched in one batch per entity kind; references that
//! no longer resolve are rendered as absent.

use std::collections::{HashMap, HashSet};

use classhub_core::AppError;
use classhub_db::{ClassroomStore, CourseStore, Store, UserStore};
use classhub_models::assignments::{Assignment, AssignmentView, ClassroomRef};
use classhub_models::classrooms::{Classroom, ClassroomView};
use classhub_models::courses::{Course, CourseRef, CourseView};
use classhub_models::{ClassroomId, CourseId, User, UserId, UserRef};

fn unique<T: Copy + Eq + std::hash::Hash>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

pub async fn users_by_id(
    store: &dyn Store,
    ids: impl IntoIterator<Item = UserId>,
) -> Result<HashMap<UserId, User>, AppError> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = store.find_users(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

pub async fn courses_by_id(
    store: &dyn Store,
    ids: impl IntoIterator<Item = CourseId>,
) -> Result<HashMap<CourseId, Course>, AppError> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let courses = store.find_courses(&ids).await?;
    Ok(courses.into_iter().map(|c| (c.id, c)).collect())
}

pub async fn course_views(
    store: &dyn Store,
    courses: Vec<Course>,
) -> Result<Vec<CourseView>, AppError> {
    let teachers = users_by_id(store, courses.iter().filter_map(|c| c.teacher_id)).await?;
    Ok(courses
        .into_iter()
        .map(|course| {
            let teacher = course
                .teacher_id
                .and_then(|id| teachers.get(&id))
                .map(UserRef::from);
            CourseView::new(course, teacher)
        })
        .collect())
}

pub async fn course_view(store: &dyn Store, course: Course) -> Result<CourseView, AppError> {
    let mut views = course_views(store, vec![course]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::internal_error("Course view missing"))
}

/// `detailed` includes each course's description.
pub async fn classroom_views(
    store: &dyn Store,
    classrooms: Vec<Classroom>,
    detailed: bool,
) -> Result<Vec<ClassroomView>, AppError> {
    let users = users_by_id(
        store,
        classrooms
            .iter()
            .flat_map(|c| c.teacher_id.into_iter().chain(c.student_ids.iter().copied())),
    )
    .await?;
    let courses = courses_by_id(store, classrooms.iter().filter_map(|c| c.course_id)).await?;

    Ok(classrooms
        .into_iter()
        .map(|classroom| ClassroomView {
            id: classroom.id,
            name: classroom.name,
            course: classroom
                .course_id
                .and_then(|id| courses.get(&id))
                .map(|course| {
                    if detailed {
                        CourseRef::detailed(course)
                    } else {
                        CourseRef::brief(course)
                    }
                }),
            teacher: classroom
                .teacher_id
                .and_then(|id| users.get(&id))
                .map(UserRef::from),
            students: classroom
                .student_ids
                .iter()
                .filter_map(|id| users.get(id))
                .map(UserRef::from)
                .collect(),
            created_at: classroom.created_at,
            updated_at: classroom.updated_at,
        })
        .collect())
}

pub async fn classroom_view(
    store: &dyn Store,
    classroom: Classroom,
    detailed: bool,
) -> Result<ClassroomView, AppError> {
    let mut views = classroom_views(store, vec![classroom], detailed).await?;
    views
        .pop()
        .ok_or_else(|| AppError::internal_error("Classroom view missing"))
}

/// Classroom id → reference carrying the classroom's course name.
pub async fn classroom_refs(
    store: &dyn Store,
    ids: impl IntoIterator<Item = ClassroomId>,
) -> Result<HashMap<ClassroomId, ClassroomRef>, AppError> {
    let mut classrooms = Vec::new();
    for id in unique(ids) {
        if let Some(classroom) = store.find_classroom(id).await? {
            classrooms.push(classroom);
        }
    }
    let courses = courses_by_id(store, classrooms.iter().filter_map(|c| c.course_id)).await?;

    Ok(classrooms
        .into_iter()
        .map(|classroom| {
            let course = classroom
                .course_id
                .and_then(|id| courses.get(&id))
                .map(|c| c.name.clone());
            (
                classroom.id,
                ClassroomRef {
                    id: classroom.id,
                    name: classroom.name,
                    course,
                },
            )
        })
        .collect())
}

pub async fn assignment_views(
    store: &dyn Store,
    assignments: Vec<Assignment>,
) -> Result<Vec<AssignmentView>, AppError> {
    let classrooms = classroom_refs(store, assignments.iter().map(|a| a.classroom_id)).await?;
    let creators = users_by_id(store, assignments.iter().map(|a| a.created_by)).await?;

    Ok(assignments
        .into_iter()
        .map(|assignment| AssignmentView {
            classroom: classrooms.get(&assignment.classroom_id).cloned(),
            creator: creators.get(&assignment.created_by).map(UserRef::from),
            assignment,
        })
        .collect())
}

pub async fn assignment_view(
    store: &dyn Store,
    assignment: Assignment,
) -> Result<AssignmentView, AppError> {
    let mut views = assignment_views(store, vec![assignment]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::internal_error("Assignment view missing"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_db::{MemoryStore, NewClassroom, NewCourse, NewUser};
    use classhub_models::Role;

    async fn user(store: &MemoryStore, name: &str, role: Role) -> User {
        store
            .insert_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_classroom_view_populates_references() {
        let store = MemoryStore::new();
        let teacher = user(&store, "Grace", Role::Teacher).await;
        let student = user(&store, "Alan", Role::Student).await;
        let course = store
            .insert_course(NewCourse {
                name: "Algorithms".to_string(),
                description: "Sorting and searching".to_string(),
                teacher_id: Some(teacher.id),
            })
            .await
            .unwrap();
        let classroom = store
            .insert_classroom(NewClassroom {
                name: "A".to_string(),
                course_id: Some(course.id),
                teacher_id: Some(teacher.id),
                student_ids: vec![student.id],
            })
            .await
            .unwrap();

        let brief = classroom_view(&store, classroom.clone(), false).await.unwrap();
        assert_eq!(brief.course.as_ref().unwrap().name, "Algorithms");
        assert!(brief.course.as_ref().unwrap().description.is_none());
        assert_eq!(brief.teacher.unwrap().name, "Grace");
        assert_eq!(brief.students.len(), 1);
        assert_eq!(brief.students[0].email, "alan@example.com");

        let detailed = classroom_view(&store, classroom, true).await.unwrap();
        assert_eq!(
            detailed.course.unwrap().description.as_deref(),
            Some("Sorting and searching")
        );
    }

    #[tokio::test]
    async fn test_dangling_references_are_absent() {
        let store = MemoryStore::new();
        let course = store
            .insert_course(NewCourse {
                name: "Orphan".to_string(),
                description: String::new(),
                teacher_id: Some(UserId::new()),
            })
            .await
            .unwrap();

        let view = course_view(&store, course).await.unwrap();
        assert!(view.teacher.is_none());
    }
}
