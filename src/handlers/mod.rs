pub mod comment;
pub mod health;
pub mod post;
pub mod report;
pub mod stats;
pub mod upload;
pub mod upvote;
