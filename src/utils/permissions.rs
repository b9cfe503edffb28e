// Politique d'autorisation, évaluée à chaque requête d'écriture
use actix_web::http::Method;

use crate::errors::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

impl Role {
    pub fn of(user: Option<&AuthUser>) -> Self {
        match user {
            None => Role::Anonymous,
            Some(u) if u.is_staff => Role::Admin,
            Some(_) => Role::User,
        }
    }
}

/// Lecture libre; écriture réservée aux admins ou au propriétaire de la ressource.
/// `owner_id = None` => ressource sans propriétaire (admin seulement).
pub fn can_access(role: Role, actor_id: Option<i32>, owner_id: Option<i32>, method: &Method) -> bool {
    if is_safe(method) || role == Role::Admin {
        return true;
    }
    match (role, actor_id, owner_id) {
        (Role::User, Some(actor), Some(owner)) => actor == owner,
        _ => false,
    }
}

/// Variante pour les handlers: PermissionDenied si refusé
pub fn ensure_access(user: &AuthUser, owner_id: Option<i32>, method: &Method) -> Result<(), ApiError> {
    if can_access(Role::of(Some(user)), Some(user.user_id), owner_id, method) {
        Ok(())
    } else {
        tracing::warn!(user_id = user.user_id, %method, "permission denied");
        Err(ApiError::PermissionDenied)
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_open() {
        assert!(can_access(Role::Anonymous, None, Some(1), &Method::GET));
        assert!(can_access(Role::User, Some(2), None, &Method::HEAD));
    }

    #[test]
    fn test_owner_can_write_own_resource() {
        assert!(can_access(Role::User, Some(1), Some(1), &Method::PUT));
        assert!(can_access(Role::User, Some(1), Some(1), &Method::DELETE));
        assert!(!can_access(Role::User, Some(2), Some(1), &Method::PUT));
    }

    #[test]
    fn test_admin_only_resources() {
        assert!(!can_access(Role::User, Some(1), None, &Method::POST));
        assert!(can_access(Role::Admin, Some(1), None, &Method::POST));
        assert!(!can_access(Role::Anonymous, None, None, &Method::DELETE));
    }

    #[test]
    fn test_anonymous_never_matches_owner() {
        assert!(!can_access(Role::Anonymous, None, Some(1), &Method::PUT));
    }
}
