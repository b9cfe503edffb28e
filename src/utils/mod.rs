pub mod jwt;
pub mod password;
pub mod permissions;
pub mod reset_token;
