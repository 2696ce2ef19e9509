use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Error;
use crate::user::model::{NewUser, User};
use crate::user::store::UserStore;
use crate::user::validate::normalize_email;

/// Sole construction path for user records. Guarantees required fields,
/// email normalization, field validation and password hashing before
/// anything reaches the store.
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create a regular account. `email` and `fields.username` must be
    /// non-empty; the password is stored only as a salted hash.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        fields: NewUser,
    ) -> Result<User, Error> {
        if email.is_empty() {
            warn!("rejected user creation without email");
            return Err(Error::InvalidArgument("Email is required.".into()));
        }
        if fields.username.is_empty() {
            warn!("rejected user creation without username");
            return Err(Error::InvalidArgument("Username is required.".into()));
        }

        let email = normalize_email(email);
        let mut user = User::new(email, fields);
        user.set_password(password)?;

        let violations = user.validate();
        if !violations.is_empty() {
            warn!(user_id = %user.id, ?violations, "rejected invalid user fields");
            return Err(Error::Validation(violations));
        }

        let user = self.store.insert_unique(user).await?;
        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Create a privileged account: a regular user with the staff and
    /// superuser flags set, persisted as an update after creation.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        fields: NewUser,
    ) -> Result<User, Error> {
        let mut admin = self.create_user(email, password, fields).await?;
        admin.is_staff = true;
        admin.is_superuser = true;
        let admin = self.store.update(&admin).await?;
        info!(user_id = %admin.id, email = %admin.email, "superuser created");
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::store::MemoryUserStore;

    fn manager() -> (UserManager, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        (UserManager::new(store.clone()), store)
    }

    fn fields(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_user_with_valid_email() {
        let (manager, store) = manager();
        let user = manager
            .create_user("test@example.com", "testpass1234", fields("myusername"))
            .await
            .expect("create user");

        assert_eq!(user.email, "test@example.com");
        assert!(user.check_password("testpass1234"));
        assert!(!user.check_password("testpass12345"));
        assert!(!user.is_staff);
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_user_without_email_fails() {
        let (manager, store) = manager();
        let err = manager
            .create_user("", "testpass1234", fields("myusername"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "Email is required."));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_user_without_username_fails() {
        let (manager, store) = manager();
        let err = manager
            .create_user("test@example.com", "testpass1234", fields(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "Username is required."));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_superuser_sets_both_flags() {
        let (manager, store) = manager();
        let admin = manager
            .create_superuser("admin@example.com", "admin1234", fields("admin"))
            .await
            .expect("create superuser");

        assert!(admin.is_superuser);
        assert!(admin.is_staff);
        assert_eq!(store.len(), 1);

        // The persisted copy carries the flags too.
        let stored = store
            .find_by_email("admin@example.com")
            .await
            .expect("lookup")
            .expect("admin should exist");
        assert!(stored.is_superuser);
        assert!(stored.is_staff);
    }

    #[tokio::test]
    async fn create_superuser_with_empty_email_fails() {
        let (manager, store) = manager();
        let err = manager
            .create_superuser("", "admin1234", fields("admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (manager, store) = manager();
        manager
            .create_user("test@example.com", "testpass1234", fields("first"))
            .await
            .expect("first create");
        let err = manager
            .create_user("test@example.com", "otherpass1234", fields("second"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UniquenessViolation { field: "email" }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (manager, store) = manager();
        manager
            .create_user("one@example.com", "testpass1234", fields("shared"))
            .await
            .expect("first create");
        let err = manager
            .create_user("two@example.com", "testpass1234", fields("shared"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UniquenessViolation { field: "username" }
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn email_domain_is_normalized() {
        let (manager, _) = manager();
        let user = manager
            .create_user("Mixed.Case@EXAMPLE.COM", "testpass1234", fields("mixedcase"))
            .await
            .expect("create user");
        assert_eq!(user.email, "Mixed.Case@example.com");
    }

    #[tokio::test]
    async fn invalid_username_fails_validation_and_persists_nothing() {
        let (manager, store) = manager();
        let err = manager
            .create_user("test@example.com", "testpass1234", fields("no spaces!"))
            .await
            .unwrap_err();
        match err {
            Error::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "username");
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn invalid_name_fails_validation() {
        let (manager, store) = manager();
        let err = manager
            .create_user(
                "test@example.com",
                "testpass1234",
                NewUser {
                    username: "myusername".into(),
                    first_name: "T3st".into(),
                    last_name: "User".into(),
                },
            )
            .await
            .unwrap_err();
        match err {
            Error::Validation(violations) => {
                assert_eq!(violations[0].field, "first_name");
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert!(store.is_empty());
    }
}
