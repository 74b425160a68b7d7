use classhub_core::hash_password;
use classhub_db::{NewUser, Store, StoreError, UserStore};
use classhub_models::{Email, Role, User};

/// Creates an admin account; the only way to obtain the first admin.
pub async fn create_admin(
    store: &dyn Store,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<User> {
    let email = Email::new(email)?;
    if name.trim().is_empty() {
        anyhow::bail!("Name cannot be empty");
    }
    if password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))?;

    let user = store
        .insert_user(NewUser {
            name: name.trim().to_string(),
            email: email.into_inner(),
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            StoreError::DuplicateEmail => anyhow::anyhow!("User with this email already exists"),
            other => other.into(),
        })?;

    Ok(user)
}
