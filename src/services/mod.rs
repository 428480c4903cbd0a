//! Domain services over the storage layer and outbound collaborators.

pub mod catalog;
pub mod comments;
pub mod mailer;
pub mod profiles;
pub mod rate_limit;
pub mod subscribers;
