use sea_orm::DatabaseConnection;

use models::errors::ModelError;
use models::user;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn repo_err(e: ModelError) -> AuthError {
    AuthError::Repository(e.to_string())
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
        match user::find_by_id(&self.db, id).await {
            Ok(u) => Ok(Some(u.into())),
            Err(ModelError::NotFound(_)) => Ok(None),
            Err(e) => Err(repo_err(e)),
        }
    }

    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<AuthUser, AuthError> {
        match user::create(&self.db, name, email, password_hash).await {
            Ok(u) => Ok(u.into()),
            Err(ModelError::Conflict(_)) => Err(AuthError::Conflict),
            Err(ModelError::Validation(m)) => Err(AuthError::Validation(m)),
            Err(e) => Err(repo_err(e)),
        }
    }

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
        match user::find_by_id(&self.db, user_id).await {
            Ok(u) => Ok(Some(Credentials { user_id: u.id, password_hash: u.password })),
            Err(ModelError::NotFound(_)) => Ok(None),
            Err(e) => Err(repo_err(e)),
        }
    }
}
