use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, UserId};
use teloxide::{ApiError, RequestError};

use super::channel::ChannelRef;

/// Membership standing reported for a user in the configured channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Member-class statuses that pass the gate
    pub fn is_member(self) -> bool {
        matches!(self, Self::Owner | Self::Administrator | Self::Member)
    }
}

impl From<&ChatMemberKind> for MemberStatus {
    fn from(kind: &ChatMemberKind) -> Self {
        match kind {
            ChatMemberKind::Owner(_) => Self::Owner,
            ChatMemberKind::Administrator(_) => Self::Administrator,
            ChatMemberKind::Member { .. } => Self::Member,
            ChatMemberKind::Restricted(_) => Self::Restricted,
            ChatMemberKind::Left => Self::Left,
            ChatMemberKind::Banned(_) => Self::Kicked,
        }
    }
}

/// Channel details used to build the join prompt
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub title: String,
    pub username: Option<String>,
    pub invite_link: Option<String>,
}

#[derive(Debug)]
pub enum ProviderError {
    /// Flood control; `retry_after` is the wait the provider asked for
    RateLimited(Option<Duration>),
    /// The configured channel identifier cannot be resolved
    ChannelMisconfigured(String),
    /// Network or API failure
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RateLimited(Some(after)) => {
                write!(f, "rate limited, retry after {:?}", after)
            }
            ProviderError::RateLimited(None) => write!(f, "rate limited"),
            ProviderError::ChannelMisconfigured(msg) => {
                write!(f, "channel misconfigured: {}", msg)
            }
            ProviderError::Unavailable(msg) => write!(f, "provider unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<RequestError> for ProviderError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::RetryAfter(secs) => Self::RateLimited(Some(secs.duration())),
            RequestError::Api(ApiError::ChatNotFound) => {
                Self::ChannelMisconfigured("chat not found".to_string())
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Channel-membership backend consumed by the gate.
///
/// Implemented by the live `Bot` below and by scripted fakes in tests.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn member_status(
        &self,
        channel: &ChannelRef,
        user_id: UserId,
    ) -> ProviderResult<MemberStatus>;

    async fn channel_info(&self, channel: &ChannelRef) -> ProviderResult<ChannelInfo>;

    /// Requests a fresh invite link limited to `member_limit` uses.
    async fn create_invite_link(
        &self,
        channel: &ChannelRef,
        member_limit: u32,
    ) -> ProviderResult<String>;
}

#[async_trait]
impl MembershipProvider for Bot {
    async fn member_status(
        &self,
        channel: &ChannelRef,
        user_id: UserId,
    ) -> ProviderResult<MemberStatus> {
        let member = self.get_chat_member(channel.recipient(), user_id).await?;
        Ok(MemberStatus::from(&member.kind))
    }

    async fn channel_info(&self, channel: &ChannelRef) -> ProviderResult<ChannelInfo> {
        let chat = self.get_chat(channel.recipient()).await?;
        Ok(ChannelInfo {
            title: chat
                .title()
                .or_else(|| chat.username())
                .unwrap_or("Channel")
                .to_string(),
            username: chat.username().map(|u| u.to_string()),
            invite_link: chat.invite_link().map(|l| l.to_string()),
        })
    }

    async fn create_invite_link(
        &self,
        channel: &ChannelRef,
        member_limit: u32,
    ) -> ProviderResult<String> {
        let link = self
            .create_chat_invite_link(channel.recipient())
            .member_limit(member_limit)
            .await?;
        Ok(link.invite_link)
    }
}
