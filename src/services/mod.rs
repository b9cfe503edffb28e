pub mod auth_service;
pub mod mail;
pub mod rating;
pub mod review_service;
pub mod token_blacklist;
