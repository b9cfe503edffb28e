use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::Utc;

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub jti: String,
    pub sub: i32,        // user_id
    pub username: String,
    pub is_staff: bool,
    pub iat: i64,        // issued at
    pub exp: i64,        // expiration timestamp
    pub token_type: String,
}

impl Claims {
    pub fn is_access(&self) -> bool {
        self.token_type == ACCESS
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == REFRESH
    }
}

/// Paire access/refresh émise au login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Émet et vérifie les JWT (HS256) access et refresh
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &[u8], access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Génère la paire access + refresh pour un utilisateur
    pub fn issue_pair(&self, user_id: i32, username: &str, is_staff: bool) -> Result<TokenPair, String> {
        Ok(TokenPair {
            access: self.issue(user_id, username, is_staff, ACCESS, self.access_ttl_secs)?,
            refresh: self.issue(user_id, username, is_staff, REFRESH, self.refresh_ttl_secs)?,
        })
    }

    /// Nouveau token d'accès à partir des claims d'un refresh token valide
    pub fn issue_access_from(&self, refresh: &Claims) -> Result<String, String> {
        self.issue(refresh.sub, &refresh.username, refresh.is_staff, ACCESS, self.access_ttl_secs)
    }

    fn issue(
        &self,
        user_id: i32,
        username: &str,
        is_staff: bool,
        token_type: &str,
        ttl_secs: i64,
    ) -> Result<String, String> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            jti: uuid::Uuid::new_v4().simple().to_string(),
            sub: user_id,
            username: username.to_string(),
            is_staff,
            iat: now,
            exp: now + ttl_secs,
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to generate token: {}", e))
    }

    /// Vérifie la signature et l'expiration, et décode les claims
    pub fn verify(&self, token: &str) -> Result<Claims, String> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))
    }
}
