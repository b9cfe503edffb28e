// ============================================================================
// SERVICE : AUTHENTIFICATION
// ============================================================================
//
// Workflow session:
//   ANONYME --login--> AUTHENTIFIÉ (access + refresh JWT)
//   AUTHENTIFIÉ --logout(refresh)--> ANONYME (jti du refresh en blacklist)
//   refresh(refresh) -> nouvel access, refusé si le jti est blacklisté
//
// Workflow reset password (aucun token stocké):
//   1. POST /auth/password-reset {email}
//   2. Backend génère le token (utils::reset_token) + uid base64 de l'id
//   3. Backend envoie le lien /auth/password-reset-confirm/<uid>/<token>/
//   4. POST sur ce lien avec {new_password}
//   5. Backend vérifie token vs hash actuel + fenêtre de validité, puis change
//      le hash (ce qui invalide le token)
//
// ============================================================================

use chrono::{TimeZone, Utc};
use sea_orm::*;
use tracing::{error, info, warn};
use validator::Validate;

use crate::errors::ApiError;
use crate::models::dto::{validate_password_strength, LoginRequest, RegisterRequest};
use crate::models::users;
use crate::services::mail::{DynMailClient, EmailMessage};
use crate::services::token_blacklist::TokenBlacklist;
use crate::utils::jwt::{Claims, JwtManager, TokenPair};
use crate::utils::password;
use crate::utils::reset_token::{self, ResetTokenGenerator};

pub struct AuthService {
    jwt: JwtManager,
    reset_tokens: ResetTokenGenerator,
    mailer: DynMailClient,
    mail_from: String,
    // Origine des liens envoyés par email (jamais dérivée du header Host)
    public_base_url: String,
}

impl AuthService {
    pub fn new(
        jwt: JwtManager,
        reset_tokens: ResetTokenGenerator,
        mailer: DynMailClient,
        mail_from: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            jwt,
            reset_tokens,
            mailer,
            mail_from: mail_from.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Crée un compte (email unique)
    pub async fn register(
        &self,
        db: &DatabaseConnection,
        request: RegisterRequest,
    ) -> Result<users::Model, ApiError> {
        request.validate()?;

        // 1. Vérifier si l'email existe déjà
        if find_by_email(db, &request.email).await?.is_some() {
            warn!(email = %request.email, "attempt to register with existing email");
            return Err(ApiError::Validation("A user with this email already exists.".to_string()));
        }

        // 2. Hash le mot de passe
        let password_hash = password::hash_password(&request.password).map_err(ApiError::Internal)?;

        // 3. Créer l'utilisateur
        let user = users::ActiveModel {
            email: Set(request.email),
            username: Set(request.username),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            last_login: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| match e.sql_err() {
            // course entre deux inscriptions avec le même email
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ApiError::Validation("A user with this email already exists.".to_string())
            }
            _ => ApiError::Database(e),
        })?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Vérifie email + mot de passe et émet la paire access/refresh
    pub async fn login(
        &self,
        db: &DatabaseConnection,
        request: LoginRequest,
    ) -> Result<(users::Model, TokenPair), ApiError> {
        request.validate()?;

        // 1. Trouver l'utilisateur
        let Some(user) = find_by_email(db, &request.email).await? else {
            warn!(email = %request.email, "failed login attempt");
            return Err(ApiError::InvalidCredentials);
        };

        // 2. Vérifier le mot de passe (un hash illisible = identifiants invalides)
        let is_valid = password::verify_password(&request.password, &user.password_hash).unwrap_or(false);
        if !is_valid {
            warn!(email = %request.email, "failed login attempt");
            return Err(ApiError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(email = %request.email, "login attempt for inactive user");
            return Err(ApiError::InactiveAccount);
        }

        // 3. Générer les JWT
        let tokens = self
            .jwt
            .issue_pair(user.id, &user.username, user.is_staff)
            .map_err(ApiError::Internal)?;

        // 4. Mettre à jour last_login
        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(Utc::now()));
        let user = active.update(db).await?;

        info!(user_id = user.id, "user logged in");
        Ok((user, tokens))
    }

    /// Nouveau token d'accès depuis un refresh token non révoqué
    pub async fn refresh(&self, db: &DatabaseConnection, refresh_token: &str) -> Result<String, ApiError> {
        let claims = self.refresh_claims(refresh_token)?;

        if TokenBlacklist::contains(db, &claims.jti).await? {
            warn!(user_id = claims.sub, "refresh with revoked token");
            return Err(ApiError::TokenRevoked);
        }

        self.jwt.issue_access_from(&claims).map_err(ApiError::Internal)
    }

    /// Révoque le refresh token (jti ajouté à la blacklist)
    pub async fn logout(&self, db: &DatabaseConnection, refresh_token: &str) -> Result<(), ApiError> {
        let claims = self.refresh_claims(refresh_token)?;

        if TokenBlacklist::contains(db, &claims.jti).await? {
            return Err(ApiError::InvalidToken("Token is blacklisted".to_string()));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now);
        TokenBlacklist::add(db, &claims.jti, claims.sub, expires_at).await?;

        info!(user_id = claims.sub, "user logged out");
        Ok(())
    }

    /// Envoie le lien de reset, construit sur `public_base_url`
    pub async fn request_reset(&self, db: &DatabaseConnection, email: &str) -> Result<(), ApiError> {
        let Some(user) = find_by_email(db, email).await? else {
            warn!(email, "password reset requested for non-existent email");
            return Err(ApiError::NotFound("No user associated with this email.".to_string()));
        };

        let token = self.reset_tokens.make_token(user.id, &user.password_hash);
        let uid = reset_token::encode_uid(user.id);
        let reset_link = format!(
            "{}/auth/password-reset-confirm/{}/{}/",
            self.public_base_url.trim_end_matches('/'),
            uid,
            token
        );

        let message = EmailMessage {
            subject: "Password Reset Request".to_string(),
            body: format!("Click the link below to reset your password:\n\n{}", reset_link),
            from: self.mail_from.clone(),
            to: vec![user.email.clone()],
        };

        // L'échec d'envoi n'est jamais renvoyé au client
        match self.mailer.send(message).await {
            Ok(()) => info!(user_id = user.id, "password reset email sent"),
            Err(e) => error!(user_id = user.id, error = %e, "failed to send password reset email"),
        }

        Ok(())
    }

    /// Vérifie uid + token et remplace le mot de passe
    pub async fn confirm_reset(
        &self,
        db: &DatabaseConnection,
        uidb64: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        validate_password_strength(new_password).map_err(|e| {
            ApiError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
        })?;

        let invalid = || ApiError::InvalidToken("Invalid token or user ID".to_string());

        // 1. Décoder l'uid et charger l'utilisateur
        let Some(user_id) = reset_token::decode_uid(uidb64) else {
            error!("invalid user ID during password reset");
            return Err(invalid());
        };
        let Some(user) = users::Entity::find_by_id(user_id).one(db).await? else {
            error!(user_id, "unknown user during password reset");
            return Err(invalid());
        };

        // 2. Vérifier le token contre le hash actuel
        if !self.reset_tokens.check_token(user.id, &user.password_hash, token) {
            warn!(user_id, "invalid or expired password reset token");
            return Err(ApiError::InvalidToken("Invalid or expired token".to_string()));
        }

        // 3. Nouveau hash (invalide le token du même coup)
        let new_hash = password::hash_password(new_password).map_err(ApiError::Internal)?;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(db).await?;

        info!(user_id, "password reset successfully");
        Ok(())
    }

    fn refresh_claims(&self, refresh_token: &str) -> Result<Claims, ApiError> {
        let claims = self.jwt.verify(refresh_token).map_err(ApiError::InvalidToken)?;
        if !claims.is_refresh() {
            return Err(ApiError::InvalidToken("Token has wrong type".to_string()));
        }
        Ok(claims)
    }
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::test_connection;
    use crate::services::mail::RecordingMailClient;
    use crate::test_support::{seed_user, test_auth_service, TEST_PASSWORD};

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Extrait (uid, token) du lien envoyé par email
    fn link_parts(body: &str) -> (String, String) {
        let path = body.split("/auth/password-reset-confirm/").nth(1).unwrap();
        let mut parts = path.trim().trim_end_matches('/').split('/');
        (parts.next().unwrap().to_string(), parts.next().unwrap().to_string())
    }

    #[actix_web::test]
    async fn test_register_then_login() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));

        let user = auth
            .register(
                &db,
                RegisterRequest {
                    username: "alice".into(),
                    email: "alice@example.com".into(),
                    password: TEST_PASSWORD.into(),
                    first_name: "Alice".into(),
                    last_name: String::new(),
                },
            )
            .await
            .unwrap();
        assert!(user.is_active);
        assert_ne!(user.password_hash, TEST_PASSWORD);

        let (logged_in, tokens) = auth
            .login(&db, login_request("alice@example.com", TEST_PASSWORD))
            .await
            .unwrap();
        assert!(logged_in.last_login.is_some());
        let claims = auth.jwt().verify(&tokens.access).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[actix_web::test]
    async fn test_register_duplicate_email() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));
        seed_user(&db, "alice@example.com", false).await;

        let err = auth
            .register(
                &db,
                RegisterRequest {
                    username: "other".into(),
                    email: "alice@example.com".into(),
                    password: TEST_PASSWORD.into(),
                    first_name: String::new(),
                    last_name: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn test_login_failures() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));
        let user = seed_user(&db, "alice@example.com", false).await;

        let err = auth.login(&db, login_request("nobody@example.com", TEST_PASSWORD)).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let err = auth.login(&db, login_request("alice@example.com", "wrong-password")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(&db).await.unwrap();

        let err = auth.login(&db, login_request("alice@example.com", TEST_PASSWORD)).await.unwrap_err();
        assert!(matches!(err, ApiError::InactiveAccount));
    }

    #[actix_web::test]
    async fn test_logout_revokes_refresh_token() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));
        seed_user(&db, "alice@example.com", false).await;

        let (_, tokens) = auth.login(&db, login_request("alice@example.com", TEST_PASSWORD)).await.unwrap();

        assert!(auth.refresh(&db, &tokens.refresh).await.is_ok());

        auth.logout(&db, &tokens.refresh).await.unwrap();

        let err = auth.refresh(&db, &tokens.refresh).await.unwrap_err();
        assert!(matches!(err, ApiError::TokenRevoked));

        let err = auth.logout(&db, &tokens.refresh).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[actix_web::test]
    async fn test_logout_rejects_malformed_and_access_tokens() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));
        seed_user(&db, "alice@example.com", false).await;
        let (_, tokens) = auth.login(&db, login_request("alice@example.com", TEST_PASSWORD)).await.unwrap();

        assert!(matches!(auth.logout(&db, "garbage").await, Err(ApiError::InvalidToken(_))));
        assert!(matches!(auth.logout(&db, &tokens.access).await, Err(ApiError::InvalidToken(_))));
        assert!(matches!(auth.refresh(&db, &tokens.access).await, Err(ApiError::InvalidToken(_))));
    }

    #[actix_web::test]
    async fn test_reset_unknown_email_sends_nothing() {
        let db = test_connection().await;
        let mailer = Arc::new(RecordingMailClient::default());
        let auth = test_auth_service(mailer.clone());

        let err = auth
            .request_reset(&db, "missing@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(mailer.messages().is_empty());
    }

    #[actix_web::test]
    async fn test_reset_flow_and_replay() {
        let db = test_connection().await;
        let mailer = Arc::new(RecordingMailClient::default());
        let auth = test_auth_service(mailer.clone());
        seed_user(&db, "alice@example.com", false).await;

        auth.request_reset(&db, "alice@example.com").await.unwrap();

        let messages = mailer.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, vec!["alice@example.com".to_string()]);
        assert_eq!(messages[0].subject, "Password Reset Request");
        assert!(messages[0].body.contains("http://localhost:8080/auth/password-reset-confirm/"));

        let (uid, token) = link_parts(&messages[0].body);
        auth.confirm_reset(&db, &uid, &token, "brand-new-password").await.unwrap();

        // Le mot de passe a changé
        assert!(auth.login(&db, login_request("alice@example.com", "brand-new-password")).await.is_ok());
        assert!(matches!(
            auth.login(&db, login_request("alice@example.com", TEST_PASSWORD)).await,
            Err(ApiError::InvalidCredentials)
        ));

        // Rejouer le même token échoue
        let err = auth.confirm_reset(&db, &uid, &token, "another-password").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[actix_web::test]
    async fn test_reset_mail_failure_is_hidden() {
        let db = test_connection().await;
        let mailer = Arc::new(RecordingMailClient {
            fail: true,
            ..Default::default()
        });
        let auth = test_auth_service(mailer.clone());
        seed_user(&db, "alice@example.com", false).await;

        assert!(auth.request_reset(&db, "alice@example.com").await.is_ok());
        assert_eq!(mailer.messages().len(), 1);
    }

    #[actix_web::test]
    async fn test_confirm_reset_bad_uid_or_token() {
        let db = test_connection().await;
        let auth = test_auth_service(Arc::new(RecordingMailClient::default()));
        let user = seed_user(&db, "alice@example.com", false).await;
        let uid = reset_token::encode_uid(user.id);

        let err = auth.confirm_reset(&db, "!!!", "1-abcd", "brand-new-password").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));

        let missing = reset_token::encode_uid(9999);
        let err = auth.confirm_reset(&db, &missing, "1-abcd", "brand-new-password").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));

        let err = auth.confirm_reset(&db, &uid, "1-abcd", "brand-new-password").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }
}
