use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument, warn};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password. New accounts get the
    /// `user` role.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1 });
    /// let input = RegisterInput { name: "Test".into(), email: "user@example.com".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name required".into()));
        }
        models::user::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let user = self.repo.create_user(&input.name, &input.email, &hash).await?;
        info!(user_id = user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token. Blocked accounts are refused
    /// even with the right password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        if user.is_blocked {
            warn!(user_id = user.id, "login_refused_blocked");
            return Err(AuthError::Blocked("contact an administrator".into()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: user.id.to_string(), role: user.role.to_string(), exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Resolve a bearer token to the current state of its user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.decode_token(token)?;
        let id: i32 = claims.sub.parse().map_err(|_| AuthError::TokenError("malformed subject".into()))?;
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{LoginInput, RegisterInput};
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let cfg = AuthConfig { jwt_secret: "unit-secret".into(), token_ttl_hours: 1 };
        (repo.clone(), AuthService::new(repo, cfg))
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput { name: "Tester".into(), email: email.into(), password: "Passw0rd!".into() }
    }

    #[tokio::test]
    async fn register_rejects_short_password_and_duplicates() {
        let (_, svc) = svc();
        let short = RegisterInput { password: "short".into(), ..register_input("a@b.io") };
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));

        svc.register(register_input("a@b.io")).await.unwrap();
        assert!(matches!(svc.register(register_input("A@B.io")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_token_resolves_back_to_user() {
        let (_, svc) = svc();
        let user = svc.register(register_input("c@d.io")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "c@d.io".into(), password: "Passw0rd!".into() })
            .await
            .unwrap();
        let resolved = svc.authenticate(&session.token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let bad = svc.login(LoginInput { email: "c@d.io".into(), password: "wrong-pass".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.authenticate("not-a-jwt").await, Err(AuthError::TokenError(_))));
    }

    #[tokio::test]
    async fn blocked_user_cannot_login() {
        let (repo, svc) = svc();
        let user = svc.register(register_input("e@f.io")).await.unwrap();
        repo.set_blocked(user.id, true);
        let res = svc.login(LoginInput { email: "e@f.io".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(res, Err(AuthError::Blocked(_))));
    }
}
