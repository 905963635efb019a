mod jwks;
mod validator;

pub mod handler;
pub mod model;
pub mod routes;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
