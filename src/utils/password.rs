use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

type HmacSha256 = Hmac<Sha256>;

// Les tests hashent beaucoup de mots de passe: on réduit le coût
#[cfg(not(test))]
const ITERATIONS: u32 = 260000;
#[cfg(test)]
const ITERATIONS: u32 = 1000;
const KEY_LENGTH: usize = 32;

/// Hash un mot de passe au format Werkzeug
/// Utilise PBKDF2-HMAC-SHA256 et un salt de 16 bytes
pub fn hash_password(password: &str) -> Result<String, String> {
    // Générer un salt aléatoire de 16 bytes
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);

    // Calculer le hash PBKDF2
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    // Encoder en base64 URL-safe sans padding
    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    // Format: pbkdf2:sha256:iterations$salt$hash
    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash produit par hash_password
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    // Parser le format: pbkdf2:sha256:iterations$salt$hash
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err("Invalid hash format".to_string());
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err("Invalid header".to_string());
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = decode_segment(parts[1])?;
    let expected_hash = decode_segment(parts[2])?;
    if expected_hash.is_empty() {
        return Err("Empty hash".to_string());
    }

    // Recalculer avec le même salt et les mêmes itérations
    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

/// Comparaison en temps constant (via le MAC, pour éviter les timing attacks)
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(b"password-compare") else {
        return false;
    };
    mac.update(a);
    let tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(b"password-compare") else {
        return false;
    };
    mac.update(b);
    mac.verify_slice(&tag).is_ok()
}

/// Segment base64 URL-safe (padding '=' toléré)
fn decode_segment(input: &str) -> Result<Vec<u8>, String> {
    URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| format!("Invalid base64 segment: {}", e))
}
