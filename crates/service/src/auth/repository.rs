use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use models::user::Role;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<i32, AuthUser>>,
        creds: Mutex<HashMap<i32, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        /// Flip the blocked flag of a stored user.
        pub fn set_blocked(&self, id: i32, blocked: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&id) {
                u.is_blocked = blocked;
            }
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email.trim().to_lowercase()).cloned())
        }

        async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            let email = email.trim().to_lowercase();
            if users.values().any(|u| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let id = users.len() as i32 + 1;
            let user = AuthUser { id, name: name.to_string(), email, role: Role::User, is_blocked: false, restaurant_id: None };
            users.insert(id, user.clone());
            self.creds
                .lock()
                .unwrap()
                .insert(id, Credentials { user_id: id, password_hash: password_hash.to_string() });
            Ok(user)
        }

        async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
