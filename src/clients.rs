pub(crate) mod feed;
pub(crate) mod publisher;

pub(crate) use feed::{CommunityFeedClient, CommunityFeedConfig, FeedSource};
pub(crate) use publisher::{MicroblogClient, MicroblogConfig, PublishError, Publisher};
