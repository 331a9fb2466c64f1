//! Authentication: JWT tokens, request extractors and rate limiting

pub mod extractor;
pub mod jwt;
pub mod rate_limit;

pub use extractor::{AdminUser, AuthUser, Editor, OptionalUser};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenType};
pub use rate_limit::RateLimiter;
