/*
 * Responsibility
 * - Provide the authorized request context (AuthCtx) to handlers
 * - axum-specific code stays in core, the type lives in types
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
