//! Demo data seeding.
//!
//! Seeds teachers, courses, classrooms and students. Every classroom is
//! created through [`RosterService`], so seeded rosters obey the same
//! exclusivity checks as API writes.

pub mod models;
pub mod users;

pub use models::{ClearReport, SeedConfig, SeedReport};

use classhub_core::password::hash_password_with_cost;
use classhub_db::{ClassroomStore, CourseStore, NewCourse, Store, UserStore};
use classhub_models::classrooms::CreateClassroomDto;
use classhub_models::{Role, UserId};
use classhub_roster::RosterService;
use std::collections::HashSet;
use std::time::Instant;

use models::SEED_TAG;
use users::{generate_users, is_seeded_email};

const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Literature",
    "Computer Science",
];

async fn insert_users(
    store: &dyn Store,
    role: Role,
    count: usize,
    password_hash: &str,
) -> anyhow::Result<Vec<UserId>> {
    let mut ids = Vec::with_capacity(count);
    for user in generate_users(role, count, password_hash) {
        ids.push(store.insert_user(user).await?.id);
    }
    Ok(ids)
}

pub async fn seed_all(
    store: &dyn Store,
    roster: &RosterService,
    config: SeedConfig,
) -> anyhow::Result<SeedReport> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...");

    let password_hash = hash_password_with_cost(&config.password, config.bcrypt_cost)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))?;

    println!("👩‍🏫 Seeding {} teachers...", config.teachers);
    let teachers = insert_users(store, Role::Teacher, config.teachers, &password_hash).await?;

    println!("🎓 Seeding {} students...", config.total_students());
    let students =
        insert_users(store, Role::Student, config.total_students(), &password_hash).await?;

    println!("📚 Seeding {} courses...", config.courses);
    let mut courses = Vec::with_capacity(config.courses);
    for idx in 0..config.courses {
        let subject = SUBJECTS[idx % SUBJECTS.len()];
        let teacher_id = (!teachers.is_empty()).then(|| teachers[idx % teachers.len()]);
        let course = store
            .insert_course(NewCourse {
                name: format!("{} {}", subject, idx / SUBJECTS.len() + 101),
                description: format!("Introductory {} {}", subject.to_lowercase(), SEED_TAG),
                teacher_id,
            })
            .await?;
        courses.push(course);
    }

    println!("🏫 Seeding {} classrooms...", config.total_classrooms());
    let mut rosters = students.chunks(config.students_per_classroom.max(1));
    let mut classrooms = 0;
    for (course_idx, course) in courses.iter().enumerate() {
        for section in 0..config.classrooms_per_course {
            let roster_ids = if config.students_per_classroom == 0 {
                Vec::new()
            } else {
                rosters
                    .next()
                    .map(|chunk| chunk.iter().map(|id| id.to_string()).collect())
                    .unwrap_or_default()
            };
            let teacher = course.teacher_id.map(|id| id.to_string());
            let letter = (b'A' + (section % 26) as u8) as char;
            roster
                .create_classroom(CreateClassroomDto {
                    name: format!("{} - Section {}", course.name, letter),
                    course: course.id.to_string(),
                    teacher,
                    students: roster_ids,
                })
                .await
                .map_err(|e| {
                    anyhow::anyhow!("Failed to seed classroom for course {}: {}", course_idx, e)
                })?;
            classrooms += 1;
        }
    }

    let report = SeedReport {
        teachers: teachers.len(),
        students: students.len(),
        courses: courses.len(),
        classrooms,
    };

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Teachers:   {}", report.teachers);
    println!("   Students:   {}", report.students);
    println!("   Courses:    {}", report.courses);
    println!("   Classrooms: {}", report.classrooms);
    println!("   Password for all seeded accounts: {}", config.password);

    Ok(report)
}

/// Removes seeded data, leaving accounts created by hand untouched.
pub async fn clear_all(store: &dyn Store, roster: &RosterService) -> anyhow::Result<ClearReport> {
    println!("🧹 Clearing seeded data...");

    let seeded_courses: Vec<_> = store
        .list_courses()
        .await?
        .into_iter()
        .filter(|c| c.description.ends_with(SEED_TAG))
        .collect();
    let course_ids: HashSet<_> = seeded_courses.iter().map(|c| c.id).collect();

    let mut report = ClearReport::default();

    for classroom in store.list_classrooms().await? {
        if classroom.course_id.is_some_and(|id| course_ids.contains(&id)) {
            roster
                .delete_classroom(classroom.id)
                .await
                .map_err(|e| {
                    anyhow::anyhow!("Failed to delete classroom {}: {}", classroom.id, e)
                })?;
            report.classrooms += 1;
        }
    }

    for course in &seeded_courses {
        roster
            .delete_course(course.id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete course {}: {}", course.id, e))?;
        report.courses += 1;
    }

    for user in store.list_users(None).await? {
        if is_seeded_email(&user.email) {
            roster
                .delete_user(user.id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete user {}: {}", user.email, e))?;
            report.users += 1;
        }
    }

    println!(
        "✅ Cleared {} users, {} courses, {} classrooms",
        report.users, report.courses, report.classrooms
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_db::{MemoryStore, NewUser};
    use std::sync::Arc;

    fn small_config() -> SeedConfig {
        SeedConfig {
            teachers: 2,
            courses: 2,
            classrooms_per_course: 2,
            students_per_classroom: 3,
            unassigned_students: 2,
            password: "password123".to_string(),
            bcrypt_cost: 4,
        }
    }

    #[tokio::test]
    async fn test_seed_respects_roster_exclusivity() {
        let store = Arc::new(MemoryStore::new());
        let roster = RosterService::new(store.clone());

        let report = seed_all(store.as_ref(), &roster, small_config()).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                teachers: 2,
                students: 14,
                courses: 2,
                classrooms: 4,
            }
        );

        let classrooms = store.list_classrooms().await.unwrap();
        let mut seen = HashSet::new();
        for classroom in &classrooms {
            assert_eq!(classroom.student_ids.len(), 3);
            for student in &classroom.student_ids {
                assert!(seen.insert(*student), "student on two rosters");
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn test_clear_keeps_manual_accounts() {
        let store = Arc::new(MemoryStore::new());
        let roster = RosterService::new(store.clone());
        store
            .insert_user(NewUser {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        seed_all(store.as_ref(), &roster, small_config()).await.unwrap();
        let cleared = clear_all(store.as_ref(), &roster).await.unwrap();

        assert_eq!(
            cleared,
            ClearReport {
                users: 16,
                courses: 2,
                classrooms: 4,
            }
        );
        let remaining = store.list_users(None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].email, "root@example.com");
        assert!(store.list_courses().await.unwrap().is_empty());
    }
}
