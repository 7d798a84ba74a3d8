pub mod security;
pub mod session;

pub use session::{session_middleware, ViewerSession, SESSION_HEADER};
