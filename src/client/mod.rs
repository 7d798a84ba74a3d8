//! Session-scoped client for the road report API: feed loading, per-card
//! interactions and the post creation wizard.

pub mod controller;
pub mod draft;
pub mod error;
pub mod feed;
pub mod notice;
pub mod remote;
pub mod session;

#[cfg(test)]
mod fake;

pub use controller::{CommentCache, PostInteractionController, Reconcile, UpvoteToggle};
pub use draft::{submit_draft, DraftStep, Geocoder, Locality, PostDraft};
pub use error::{ClientError, ClientResult};
pub use feed::{FeedLoader, FeedPage, PostView};
pub use notice::{Notice, NoticeKind};
pub use remote::{HttpRemoteStore, PhotoAttachment, RemoteStore};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionId, SessionIdentityProvider, SessionStore,
};
