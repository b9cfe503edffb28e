// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - dto : Requêtes/réponses de l'API (validées avec validator)
//   - users : Comptes utilisateurs (email unique, hash PBKDF2)
//   - stream_platform : Plateformes de streaming
//   - watchlist : Titres regardables + agrégat des notes
//   - review : Une review (note 1..5 + texte) par utilisateur et par titre
//   - token_blacklist : Refresh tokens révoqués au logout
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Le token de reset password n'est PAS stocké (voir utils::reset_token)
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod stream_platform;
pub mod watchlist;
pub mod review;
pub mod token_blacklist;
