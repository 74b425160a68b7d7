use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use crate::classrooms::Classroom;
use crate::courses::Course;
use crate::ids::{CourseId, UserId};
use crate::users::{Role, User};

const NONE: &str = "-";
const NOT_ASSIGNED: &str = "Not Assigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentPlacement {
    pub name: String,
    pub email: String,
    pub class: String,
    pub course: String,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeacherClass {
    pub name: String,
    pub course: String,
    pub students: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeacherLoad {
    pub name: String,
    pub email: String,
    pub classes: Vec<TeacherClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SummaryCounts {
    pub total_students: usize,
    pub students_in_classes: usize,
    pub students_not_assigned: usize,
    pub total_teachers: usize,
    pub total_courses: usize,
    pub total_classes: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSummary {
    pub students: Vec<StudentPlacement>,
    pub teachers: Vec<TeacherLoad>,
    pub counts: SummaryCounts,
}

impl AdminSummary {
    /// Builds the report from full snapshots of users, courses and classrooms.
    ///
    /// Students in a classroom come first in classroom order, followed by
    /// every student not on any roster. Teachers appear once, in the order of
    /// the first classroom they teach.
    pub fn build(users: &[User], courses: &[Course], classrooms: &[Classroom]) -> Self {
        let users_by_id: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();
        let course_names: HashMap<CourseId, &str> =
            courses.iter().map(|c| (c.id, c.name.as_str())).collect();

        let course_name = |classroom: &Classroom| {
            classroom
                .course_id
                .and_then(|id| course_names.get(&id).copied())
                .unwrap_or(NONE)
                .to_string()
        };

        let mut students = Vec::new();
        let mut placed: HashSet<UserId> = HashSet::new();
        let mut teachers: Vec<TeacherLoad> = Vec::new();

        for classroom in classrooms {
            let teacher = classroom.teacher_id.and_then(|id| users_by_id.get(&id));
            let roster: Vec<&User> = classroom
                .student_ids
                .iter()
                .filter_map(|id| users_by_id.get(id).copied())
                .collect();

            for student in &roster {
                placed.insert(student.id);
                students.push(StudentPlacement {
                    name: student.name.clone(),
                    email: student.email.clone(),
                    class: classroom.name.clone(),
                    course: course_name(classroom),
                    teacher: teacher.map_or(NONE.to_string(), |t| t.name.clone()),
                });
            }

            if let Some(teacher) = teacher {
                let class = TeacherClass {
                    name: classroom.name.clone(),
                    course: course_name(classroom),
                    students: roster.iter().map(|s| s.name.clone()).collect(),
                };
                match teachers.iter_mut().find(|t| t.email == teacher.email) {
                    Some(entry) => entry.classes.push(class),
                    None => teachers.push(TeacherLoad {
                        name: teacher.name.clone(),
                        email: teacher.email.clone(),
                        classes: vec![class],
                    }),
                }
            }
        }

        let all_students: Vec<&User> = users.iter().filter(|u| u.role == Role::Student).collect();
        for student in &all_students {
            if !placed.contains(&student.id) {
                students.push(StudentPlacement {
                    name: student.name.clone(),
                    email: student.email.clone(),
                    class: NOT_ASSIGNED.to_string(),
                    course: NOT_ASSIGNED.to_string(),
                    teacher: NOT_ASSIGNED.to_string(),
                });
            }
        }

        let counts = SummaryCounts {
            total_students: all_students.len(),
            students_in_classes: placed.len(),
            students_not_assigned: all_students.len().saturating_sub(placed.len()),
            total_teachers: users.iter().filter(|u| u.role == Role::Teacher).count(),
            total_courses: courses.len(),
            total_classes: classrooms.len(),
        };

        Self {
            students,
            teachers,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClassroomId;
    use chrono::Utc;

    fn user(name: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn classroom(
        name: &str,
        course: Option<CourseId>,
        teacher: Option<UserId>,
        students: Vec<UserId>,
    ) -> Classroom {
        Classroom {
            id: ClassroomId::new(),
            name: name.to_string(),
            course_id: course,
            teacher_id: teacher,
            student_ids: students,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_places_and_groups() {
        let teacher = user("Grace", Role::Teacher);
        let s1 = user("Alan", Role::Student);
        let s2 = user("Barbara", Role::Student);
        let s3 = user("Edsger", Role::Student);
        let course = Course {
            id: CourseId::new(),
            name: "Algorithms".to_string(),
            description: String::new(),
            teacher_id: Some(teacher.id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let rooms = vec![
            classroom("A", Some(course.id), Some(teacher.id), vec![s1.id]),
            classroom("B", None, Some(teacher.id), vec![s2.id]),
            classroom("C", None, None, vec![]),
        ];
        let users = vec![teacher.clone(), s1, s2, s3];

        let summary = AdminSummary::build(&users, &[course], &rooms);

        assert_eq!(summary.students.len(), 3);
        assert_eq!(summary.students[0].class, "A");
        assert_eq!(summary.students[0].course, "Algorithms");
        assert_eq!(summary.students[1].course, "-");
        assert_eq!(summary.students[2].name, "Edsger");
        assert_eq!(summary.students[2].class, "Not Assigned");

        assert_eq!(summary.teachers.len(), 1);
        assert_eq!(summary.teachers[0].classes.len(), 2);
        assert_eq!(summary.teachers[0].classes[1].students, vec!["Barbara".to_string()]);

        assert_eq!(
            summary.counts,
            SummaryCounts {
                total_students: 3,
                students_in_classes: 2,
                students_not_assigned: 1,
                total_teachers: 1,
                total_courses: 1,
                total_classes: 3,
            }
        );
    }
}
