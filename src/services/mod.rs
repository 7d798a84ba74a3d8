pub mod cache;
pub mod comment;
pub mod engagement;
pub mod feed_filter;
pub mod post;
pub mod report;
pub mod stats;
pub mod upload;
pub mod upvote;
