pub mod authorizer;
pub mod health;
pub mod upload;
