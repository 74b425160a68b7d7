use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use classhub_core::ErrorResponse;
use classhub_models::MessageResponse;
use classhub_models::admin::{
    AdminSummary, StudentPlacement, SummaryCounts, TeacherClass, TeacherLoad,
};
use classhub_models::announcements::{
    Announcement, AnnouncementView, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use classhub_models::assignments::{
    Assignment, AssignmentView, ClassroomRef, CreateAssignmentDto, UpdateAssignmentDto,
};
use classhub_models::auth::{LoginRequest, LoginResponse};
use classhub_models::classrooms::{
    Classroom, ClassroomEnvelope, ClassroomView, ClassroomsEnvelope, CreateClassroomDto,
    RosterStudentDto, UpdateClassroomDto,
};
use classhub_models::courses::{
    Course, CourseDetail, CourseEnvelope, CourseRef, CourseView, CoursesEnvelope, CreateCourseDto,
    UpdateCourseDto,
};
use classhub_models::submissions::{
    AssignmentRef, GradeSubmissionDto, Submission, SubmissionStats, SubmissionUploadForm,
    SubmissionView,
};
use classhub_models::users::{
    CreateUserDto, Role, UpdateProfileDto, UpdateUserDto, User, UserDetail, UserEnvelope,
    UserRef, UsersEnvelope,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::register_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classrooms,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::get_student_classrooms,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::delete_classroom,
        crate::modules::classrooms::controller::add_student,
        crate::modules::classrooms::controller::remove_student,
        crate::modules::assignments::controller::create_assignment,
        crate::modules::assignments::controller::get_assignments,
        crate::modules::assignments::controller::get_assignment,
        crate::modules::assignments::controller::get_classroom_assignments,
        crate::modules::assignments::controller::update_assignment,
        crate::modules::assignments::controller::delete_assignment,
        crate::modules::announcements::controller::get_announcements,
        crate::modules::announcements::controller::get_classroom_announcements,
        crate::modules::announcements::controller::create_announcement,
        crate::modules::announcements::controller::update_announcement,
        crate::modules::announcements::controller::delete_announcement,
        crate::modules::submissions::controller::create_submission,
        crate::modules::submissions::controller::update_submission,
        crate::modules::submissions::controller::grade_submission,
        crate::modules::submissions::controller::delete_submission,
        crate::modules::submissions::controller::get_assignment_submissions,
        crate::modules::submissions::controller::get_student_submissions,
        crate::modules::submissions::controller::get_submission_stats,
        crate::modules::admin::controller::get_summary,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            Role,
            User,
            UserRef,
            UserDetail,
            UserEnvelope,
            UsersEnvelope,
            CreateUserDto,
            UpdateUserDto,
            UpdateProfileDto,
            Course,
            CourseRef,
            CourseView,
            CourseDetail,
            CourseEnvelope,
            CoursesEnvelope,
            CreateCourseDto,
            UpdateCourseDto,
            Classroom,
            ClassroomView,
            ClassroomEnvelope,
            ClassroomsEnvelope,
            CreateClassroomDto,
            UpdateClassroomDto,
            RosterStudentDto,
            Assignment,
            AssignmentView,
            ClassroomRef,
            CreateAssignmentDto,
            UpdateAssignmentDto,
            Announcement,
            AnnouncementView,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            Submission,
            SubmissionView,
            AssignmentRef,
            SubmissionUploadForm,
            GradeSubmissionDto,
            SubmissionStats,
            AdminSummary,
            StudentPlacement,
            TeacherClass,
            TeacherLoad,
            SummaryCounts,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and account registration"),
        (name = "Users", description = "User management and self-service profiles"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Classrooms", description = "Classrooms and their exclusive rosters"),
        (name = "Assignments", description = "Assignments posted to classrooms"),
        (name = "Announcements", description = "Classroom announcements"),
        (name = "Submissions", description = "Student submissions, uploads and grading"),
        (name = "Admin", description = "Administrative summaries")
    ),
    info(
        title = "ClassHub API",
        version = "0.1.0",
        description = "Classroom management REST API: courses, classrooms with exclusive rosters, assignments, announcements and graded submissions.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_roster_and_submission_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/classrooms/{id}/add-student"));
        assert!(doc.paths.paths.contains_key("/api/submissions/stats/{teacher_id}"));
        assert!(doc.paths.paths.contains_key("/api/admin/summary"));
    }

    #[test]
    fn test_openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
