pub mod comment;
pub mod post;
pub mod report;
pub mod upvote;

pub use comment::{Entity as PostComment, Model as CommentModel};
pub use post::{Entity as Post, Model as PostModel, Severity};
pub use report::{Entity as PostReport, Model as ReportModel};
pub use upvote::{Entity as PostUpvote, Model as UpvoteModel};
