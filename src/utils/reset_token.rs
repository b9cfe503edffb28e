// ============================================================================
// TOKENS DE RESET PASSWORD (sans stockage)
// ============================================================================
//
// Format du token: "<bucket en hex>-<HMAC-SHA256 en hex>"
//   - bucket = floor(timestamp / granularity)
//   - HMAC sur "password-reset|<user_id>|<password_hash>|<bucket>" avec le secret
//
// Points d'attention:
//   - Le hash du mot de passe fait partie de la signature: dès que le mot de
//     passe change, tous les tokens émis avant deviennent invalides (usage unique)
//   - Accepté si 0 <= bucket_courant - bucket <= max_steps
//   - L'uid du lien est l'id utilisateur en base64 URL-safe sans padding
//
// ============================================================================

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct ResetTokenGenerator {
    secret: Vec<u8>,
    granularity_secs: i64,
    max_steps: i64,
}

impl ResetTokenGenerator {
    pub fn new(secret: &[u8], granularity_secs: i64, max_steps: i64) -> Self {
        Self {
            secret: secret.to_vec(),
            granularity_secs: granularity_secs.max(1),
            max_steps: max_steps.max(0),
        }
    }

    pub fn make_token(&self, user_id: i32, password_hash: &str) -> String {
        self.make_token_at(user_id, password_hash, Utc::now().timestamp())
    }

    pub fn check_token(&self, user_id: i32, password_hash: &str, token: &str) -> bool {
        self.check_token_at(user_id, password_hash, token, Utc::now().timestamp())
    }

    pub fn make_token_at(&self, user_id: i32, password_hash: &str, now: i64) -> String {
        let bucket = self.bucket(now);
        let signature = self.mac(user_id, password_hash, bucket).finalize().into_bytes();
        format!("{:x}-{}", bucket, hex::encode(signature))
    }

    pub fn check_token_at(&self, user_id: i32, password_hash: &str, token: &str, now: i64) -> bool {
        let Some((bucket_hex, signature_hex)) = token.split_once('-') else {
            return false;
        };
        let Ok(bucket) = i64::from_str_radix(bucket_hex, 16) else {
            return false;
        };
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };

        // Fenêtre de validité: pas dans le futur, pas plus vieux que max_steps
        let age = self.bucket(now) - bucket;
        if age < 0 || age > self.max_steps {
            return false;
        }

        self.mac(user_id, password_hash, bucket)
            .verify_slice(&signature)
            .is_ok()
    }

    fn bucket(&self, timestamp: i64) -> i64 {
        timestamp.div_euclid(self.granularity_secs)
    }

    fn mac(&self, user_id: i32, password_hash: &str, bucket: i64) -> HmacSha256 {
        // HMAC accepte des clés de toute taille: new_from_slice ne peut pas échouer
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(format!("password-reset|{}|{}|{}", user_id, password_hash, bucket).as_bytes());
        mac
    }
}

/// Encode l'id utilisateur pour le lien de reset
pub fn encode_uid(user_id: i32) -> String {
    URL_SAFE_NO_PAD.encode(user_id.to_string())
}

/// Décode l'uid du lien; None si ce n'est pas un id valide
pub fn decode_uid(uidb64: &str) -> Option<i32> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()?.parse().ok()
}
