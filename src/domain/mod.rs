//! Domain types shared across services and routes.

pub mod comment;
pub mod profile;
pub mod subscriber;
pub mod tool;

pub use comment::{Comment, CommentWithTool};
pub use profile::Profile;
pub use subscriber::{Subscriber, SubscriptionStatus};
pub use tool::Tool;
