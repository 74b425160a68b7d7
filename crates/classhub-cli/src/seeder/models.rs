//! Seeding configuration.

/// Seeded accounts all live under this email domain, which is how
/// `clear-seed` finds them again.
pub const SEED_EMAIL_DOMAIN: &str = "seed.classhub.test";

/// Appended to seeded course descriptions.
pub const SEED_TAG: &str = "[seed]";

pub const DEFAULT_SEED_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub courses: usize,
    pub classrooms_per_course: usize,
    pub students_per_classroom: usize,
    /// Students left off every roster.
    pub unassigned_students: usize,
    pub password: String,
    pub bcrypt_cost: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 5,
            courses: 4,
            classrooms_per_course: 2,
            students_per_classroom: 20,
            unassigned_students: 10,
            password: DEFAULT_SEED_PASSWORD.to_string(),
            bcrypt_cost: 10,
        }
    }
}

impl SeedConfig {
    pub fn total_classrooms(&self) -> usize {
        self.courses * self.classrooms_per_course
    }

    pub fn total_students(&self) -> usize {
        self.total_classrooms() * self.students_per_classroom + self.unassigned_students
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub teachers: usize,
    pub students: usize,
    pub courses: usize,
    pub classrooms: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    pub users: usize,
    pub courses: usize,
    pub classrooms: usize,
}
