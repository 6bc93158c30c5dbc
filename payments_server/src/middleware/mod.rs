mod jwt;

pub use jwt::{JwtAuthMiddlewareFactory, JwtAuthMiddlewareService};
