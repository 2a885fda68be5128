//! Membership gate: every user-initiated action is allowed through only when
//! the user is a member of the configured channel.
//!
//! Verified users are remembered in an injected [`VerifiedCache`] and
//! re-checked live on their next action, so people who leave the channel lose
//! access on the following interaction. Failure handling is asymmetric on
//! purpose: a failed re-check of a cached user evicts and blocks, while a
//! failure to resolve the channel at all lets the user through, so an
//! unreachable channel cannot lock everyone out.

mod cache;
mod channel;
mod provider;

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::UserId;

pub use cache::VerifiedCache;
pub use channel::ChannelRef;
pub use provider::{
    ChannelInfo, MemberStatus, MembershipProvider, ProviderError, ProviderResult,
};

use crate::utils::{truncate_for_display, MenuAction};

/// Invite-link creation attempts before giving up on flood control
const INVITE_LINK_ATTEMPTS: u32 = 2;
/// Wait applied when the provider rate-limits without naming a delay
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);
/// Fresh invite links are single-use
const INVITE_LINK_MEMBER_LIMIT: u32 = 1;
/// Provider error details are cut down to this many characters for display
const VERIFY_ERROR_MAX_CHARS: usize = 100;

/// Payload shown to a blocked user
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPrompt {
    pub channel_name: String,
    pub invite_link: String,
    pub verify_action: MenuAction,
    pub dismiss_action: MenuAction,
}

/// Outcome of [`MembershipGate::authorize`]
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed,
    Blocked(JoinPrompt),
}

/// Outcome of [`MembershipGate::verify`]
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Verified,
    NotMember,
    Error(String),
}

#[derive(Clone)]
pub struct MembershipGate {
    provider: Arc<dyn MembershipProvider>,
    channel: Option<ChannelRef>,
    owner_id: UserId,
    cache: VerifiedCache,
}

impl MembershipGate {
    pub fn new(
        provider: Arc<dyn MembershipProvider>,
        channel: Option<ChannelRef>,
        owner_id: UserId,
        cache: VerifiedCache,
    ) -> Self {
        Self {
            provider,
            channel,
            owner_id,
            cache,
        }
    }

    /// Decides whether `user_id` may use the bot right now.
    ///
    /// Cached users are re-checked live so stale memberships are caught; a
    /// re-check that cannot be completed counts as "not a member".
    pub async fn authorize(&self, user_id: UserId) -> Decision {
        if user_id == self.owner_id {
            return Decision::Allowed;
        }
        let Some(channel) = &self.channel else {
            return Decision::Allowed;
        };

        if self.cache.contains(user_id).await {
            match self.provider.member_status(channel, user_id).await {
                Ok(status) if status.is_member() => {
                    log::debug!("User {} is still a channel member", user_id);
                    return Decision::Allowed;
                }
                Ok(status) => {
                    log::warn!(
                        "User {} left the channel (status {:?}), evicting from cache",
                        user_id,
                        status
                    );
                    self.cache.remove(user_id).await;
                }
                Err(err) => {
                    log::warn!("Could not re-verify cached user {}: {}", user_id, err);
                    self.cache.remove(user_id).await;
                }
            }
        }

        match self.join_prompt(channel).await {
            Ok(prompt) => Decision::Blocked(prompt),
            Err(err) => {
                // Channel info unreachable: let the user through instead of
                // locking everyone out while the channel is down. Re-checks
                // above stay closed.
                log::error!("Could not resolve channel info, allowing access: {}", err);
                Decision::Allowed
            }
        }
    }

    /// One live membership query, run when the user presses "Verify" after
    /// joining. Success adds the user to the cache.
    pub async fn verify(&self, user_id: UserId) -> VerifyOutcome {
        let Some(channel) = &self.channel else {
            // Stale prompt on screen while the gate is disabled
            return VerifyOutcome::Verified;
        };

        match self.provider.member_status(channel, user_id).await {
            Ok(status) if status.is_member() => {
                if self.cache.insert(user_id).await {
                    log::info!("User {} verified as channel member", user_id);
                }
                VerifyOutcome::Verified
            }
            Ok(status) => {
                log::info!(
                    "User {} pressed verify but is not a member (status {:?})",
                    user_id,
                    status
                );
                VerifyOutcome::NotMember
            }
            Err(err) => VerifyOutcome::Error(truncate_for_display(
                &err.to_string(),
                VERIFY_ERROR_MAX_CHARS,
            )),
        }
    }

    async fn join_prompt(&self, channel: &ChannelRef) -> ProviderResult<JoinPrompt> {
        let info = self.provider.channel_info(channel).await?;

        let invite_link = if let Some(username) = &info.username {
            format!("https://t.me/{}", username)
        } else if let Some(link) = &info.invite_link {
            link.clone()
        } else {
            self.fresh_invite_link(channel).await
        };

        Ok(JoinPrompt {
            channel_name: info.title,
            invite_link,
            verify_action: MenuAction::Verify,
            dismiss_action: MenuAction::Dismiss,
        })
    }

    /// Requests a single-use invite link, backing off once on flood control.
    /// When the provider keeps refusing, falls back to a plain t.me link so
    /// the prompt always carries something clickable.
    async fn fresh_invite_link(&self, channel: &ChannelRef) -> String {
        for attempt in 1..=INVITE_LINK_ATTEMPTS {
            match self
                .provider
                .create_invite_link(channel, INVITE_LINK_MEMBER_LIMIT)
                .await
            {
                Ok(link) => return link,
                Err(ProviderError::RateLimited(retry_after)) if attempt < INVITE_LINK_ATTEMPTS => {
                    let delay = retry_after.unwrap_or(DEFAULT_RETRY_AFTER);
                    log::info!(
                        "Rate limited while creating invite link, sleeping {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    log::warn!("Could not create invite link: {}", err);
                    break;
                }
            }
        }
        channel.deep_link()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use teloxide::types::ChatId;

    use super::*;

    const OWNER: UserId = UserId(1);

    /// Scripted provider: responses are consumed front to back, every call
    /// is counted, and an unscripted call fails loudly.
    #[derive(Default)]
    struct FakeProvider {
        statuses: Mutex<VecDeque<ProviderResult<MemberStatus>>>,
        infos: Mutex<VecDeque<ProviderResult<ChannelInfo>>>,
        links: Mutex<VecDeque<ProviderResult<String>>>,
        status_calls: AtomicUsize,
        info_calls: AtomicUsize,
        link_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn push_status(&self, result: ProviderResult<MemberStatus>) {
            self.statuses.lock().unwrap().push_back(result);
        }

        fn push_info(&self, result: ProviderResult<ChannelInfo>) {
            self.infos.lock().unwrap().push_back(result);
        }

        fn push_link(&self, result: ProviderResult<String>) {
            self.links.lock().unwrap().push_back(result);
        }

        fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        fn link_calls(&self) -> usize {
            self.link_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MembershipProvider for FakeProvider {
        async fn member_status(
            &self,
            _channel: &ChannelRef,
            _user_id: UserId,
        ) -> ProviderResult<MemberStatus> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Unavailable("unscripted call".into())))
        }

        async fn channel_info(&self, _channel: &ChannelRef) -> ProviderResult<ChannelInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            self.infos
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Unavailable("unscripted call".into())))
        }

        async fn create_invite_link(
            &self,
            _channel: &ChannelRef,
            _member_limit: u32,
        ) -> ProviderResult<String> {
            self.link_calls.fetch_add(1, Ordering::SeqCst);
            self.links
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Unavailable("unscripted call".into())))
        }
    }

    fn private_channel_info() -> ChannelInfo {
        ChannelInfo {
            title: "Test Channel".to_string(),
            username: None,
            invite_link: None,
        }
    }

    fn test_channel() -> ChannelRef {
        ChannelRef::Id(ChatId(-1001234567890))
    }

    fn gate(
        provider: &Arc<FakeProvider>,
        channel: Option<ChannelRef>,
        cache: &VerifiedCache,
    ) -> MembershipGate {
        MembershipGate::new(provider.clone(), channel, OWNER, cache.clone())
    }

    fn expect_blocked(decision: Decision) -> JoinPrompt {
        match decision {
            Decision::Blocked(prompt) => prompt,
            Decision::Allowed => panic!("expected Blocked, got Allowed"),
        }
    }

    #[tokio::test]
    async fn allows_everyone_when_gate_unconfigured() {
        let provider = Arc::new(FakeProvider::default());
        let gate = gate(&provider, None, &VerifiedCache::new());

        assert_eq!(gate.authorize(UserId(42)).await, Decision::Allowed);
        assert_eq!(provider.status_calls(), 0);
        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn owner_bypasses_without_provider_calls() {
        let provider = Arc::new(FakeProvider::default());
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        assert_eq!(gate.authorize(OWNER).await, Decision::Allowed);
        assert_eq!(provider.status_calls(), 0);
        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.link_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_user_gets_prompt_with_public_handle_link() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(ChannelInfo {
            title: "Test Channel".to_string(),
            username: Some("mychannel".to_string()),
            invite_link: None,
        }));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let prompt = expect_blocked(gate.authorize(UserId(99)).await);
        assert_eq!(prompt.channel_name, "Test Channel");
        assert_eq!(prompt.invite_link, "https://t.me/mychannel");
        assert!(!prompt.invite_link.is_empty());
        // Uncached users are never membership-queried by authorize
        assert_eq!(provider.status_calls(), 0);
        assert_eq!(provider.link_calls(), 0);
    }

    #[tokio::test]
    async fn cached_member_class_user_stays_allowed_and_cached() {
        for status in [
            MemberStatus::Member,
            MemberStatus::Administrator,
            MemberStatus::Owner,
        ] {
            let provider = Arc::new(FakeProvider::default());
            provider.push_status(Ok(status));
            let cache = VerifiedCache::new();
            cache.insert(UserId(7)).await;
            let gate = gate(&provider, Some(test_channel()), &cache);

            assert_eq!(gate.authorize(UserId(7)).await, Decision::Allowed);
            assert!(cache.contains(UserId(7)).await);
            assert_eq!(provider.status_calls(), 1);
        }
    }

    #[tokio::test]
    async fn cached_leaver_is_evicted_then_takes_uncached_path() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_status(Ok(MemberStatus::Left));
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Ok("https://t.me/+one".to_string()));
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Ok("https://t.me/+two".to_string()));

        let cache = VerifiedCache::new();
        cache.insert(UserId(7)).await;
        let gate = gate(&provider, Some(test_channel()), &cache);

        expect_blocked(gate.authorize(UserId(7)).await);
        assert!(!cache.contains(UserId(7)).await);
        assert_eq!(provider.status_calls(), 1);

        // No longer cached, so the second call skips the re-check entirely
        expect_blocked(gate.authorize(UserId(7)).await);
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn failed_recheck_of_cached_user_fails_closed() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_status(Err(ProviderError::Unavailable("timeout".into())));
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Ok("https://t.me/+fresh".to_string()));

        let cache = VerifiedCache::new();
        cache.insert(UserId(7)).await;
        let gate = gate(&provider, Some(test_channel()), &cache);

        expect_blocked(gate.authorize(UserId(7)).await);
        assert!(!cache.contains(UserId(7)).await);
    }

    #[tokio::test]
    async fn unreachable_channel_info_fails_open() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Err(ProviderError::Unavailable("network down".into())));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        assert_eq!(gate.authorize(UserId(99)).await, Decision::Allowed);
    }

    #[tokio::test]
    async fn reuses_known_invite_link_before_creating_one() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(ChannelInfo {
            title: "Test Channel".to_string(),
            username: None,
            invite_link: Some("https://t.me/+existing".to_string()),
        }));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let prompt = expect_blocked(gate.authorize(UserId(99)).await);
        assert_eq!(prompt.invite_link, "https://t.me/+existing");
        assert_eq!(provider.link_calls(), 0);
    }

    #[tokio::test]
    async fn private_channel_gets_fresh_single_use_link() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Ok("https://t.me/+fresh".to_string()));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let prompt = expect_blocked(gate.authorize(UserId(99)).await);
        assert_eq!(prompt.invite_link, "https://t.me/+fresh");
        assert_eq!(provider.link_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invite_link_rate_limit_backs_off_and_retries_once() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Err(ProviderError::RateLimited(Some(Duration::from_secs(
            2,
        )))));
        provider.push_link(Ok("https://t.me/+after-wait".to_string()));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let started = tokio::time::Instant::now();
        let prompt = expect_blocked(gate.authorize(UserId(99)).await);

        assert_eq!(prompt.invite_link, "https://t.me/+after-wait");
        assert_eq!(provider.link_calls(), 2);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_without_hint_waits_the_default() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Err(ProviderError::RateLimited(None)));
        provider.push_link(Ok("https://t.me/+eventually".to_string()));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let started = tokio::time::Instant::now();
        expect_blocked(gate.authorize(UserId(99)).await);

        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn invite_link_failure_falls_back_to_deep_link() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Err(ProviderError::Unavailable("forbidden".into())));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let prompt = expect_blocked(gate.authorize(UserId(99)).await);
        assert_eq!(prompt.invite_link, "https://t.me/c/1234567890");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_rate_limit_gives_up_after_bounded_attempts() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_info(Ok(private_channel_info()));
        provider.push_link(Err(ProviderError::RateLimited(Some(Duration::from_secs(
            1,
        )))));
        provider.push_link(Err(ProviderError::RateLimited(Some(Duration::from_secs(
            1,
        )))));
        let gate = gate(&provider, Some(test_channel()), &VerifiedCache::new());

        let prompt = expect_blocked(gate.authorize(UserId(99)).await);
        assert_eq!(prompt.invite_link, "https://t.me/c/1234567890");
        assert_eq!(provider.link_calls(), 2);
    }

    #[tokio::test]
    async fn verify_member_inserts_and_is_idempotent() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_status(Ok(MemberStatus::Member));
        provider.push_status(Ok(MemberStatus::Member));
        let cache = VerifiedCache::new();
        let gate = gate(&provider, Some(test_channel()), &cache);

        assert_eq!(gate.verify(UserId(5)).await, VerifyOutcome::Verified);
        assert!(cache.contains(UserId(5)).await);

        assert_eq!(gate.verify(UserId(5)).await, VerifyOutcome::Verified);
        assert!(cache.contains(UserId(5)).await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn verify_non_member_never_inserts() {
        for status in [
            MemberStatus::Left,
            MemberStatus::Kicked,
            MemberStatus::Restricted,
        ] {
            let provider = Arc::new(FakeProvider::default());
            provider.push_status(Ok(status));
            let cache = VerifiedCache::new();
            let gate = gate(&provider, Some(test_channel()), &cache);

            assert_eq!(gate.verify(UserId(5)).await, VerifyOutcome::NotMember);
            assert!(!cache.contains(UserId(5)).await);
        }
    }

    #[tokio::test]
    async fn verify_error_detail_is_truncated_for_display() {
        let provider = Arc::new(FakeProvider::default());
        provider.push_status(Err(ProviderError::Unavailable("x".repeat(300))));
        let cache = VerifiedCache::new();
        let gate = gate(&provider, Some(test_channel()), &cache);

        match gate.verify(UserId(5)).await {
            VerifyOutcome::Error(detail) => {
                assert_eq!(detail.chars().count(), VERIFY_ERROR_MAX_CHARS)
            }
            other => panic!("expected VerifyOutcome::Error, got {:?}", other),
        }
        assert!(!cache.contains(UserId(5)).await);
    }

    #[tokio::test]
    async fn verify_without_channel_is_a_no_op_success() {
        let provider = Arc::new(FakeProvider::default());
        let gate = gate(&provider, None, &VerifiedCache::new());

        assert_eq!(gate.verify(UserId(5)).await, VerifyOutcome::Verified);
        assert_eq!(provider.status_calls(), 0);
    }
}
