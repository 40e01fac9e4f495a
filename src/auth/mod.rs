//! Authentication: JWT tokens, password hashing, request middleware

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::JwtService;
pub use password::PasswordHasher;
