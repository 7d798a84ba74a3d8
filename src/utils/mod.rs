pub mod cookie;
pub mod geo;
pub mod session;

pub use geo::external_map_url;
pub use session::{generate_session_token, is_valid_session_token};
