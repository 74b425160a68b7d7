//! Fake user generation.

use classhub_db::NewUser;
use classhub_models::Role;
use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;

use super::models::SEED_EMAIL_DOMAIN;

fn email_part(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn generate_user(role: Role, idx: usize, password_hash: &str) -> NewUser {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        email_part(&first_name),
        email_part(&last_name),
        role.as_str(),
        idx,
        SEED_EMAIL_DOMAIN
    );

    NewUser {
        name: format!("{} {}", first_name, last_name),
        email,
        password_hash: password_hash.to_string(),
        role,
    }
}

/// Generates `count` users of one role in parallel. Emails are unique per
/// role through the index suffix.
pub fn generate_users(role: Role, count: usize, password_hash: &str) -> Vec<NewUser> {
    (0..count)
        .into_par_iter()
        .map(|idx| generate_user(role, idx, password_hash))
        .collect()
}

pub fn is_seeded_email(email: &str) -> bool {
    email.ends_with(&format!("@{}", SEED_EMAIL_DOMAIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_emails_are_unique_and_tagged() {
        let users = generate_users(Role::Student, 50, "hash");
        assert_eq!(users.len(), 50);

        let emails: HashSet<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 50);
        assert!(users.iter().all(|u| is_seeded_email(&u.email)));
        assert!(users.iter().all(|u| u.role == Role::Student));
    }

    #[test]
    fn test_email_part_strips_punctuation() {
        assert_eq!(email_part("O'Kon"), "okon");
    }
}
