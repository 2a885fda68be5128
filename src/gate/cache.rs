use std::collections::HashSet;
use std::sync::Arc;

use teloxide::types::UserId;
use tokio::sync::Mutex;

/// Set of user ids confirmed as channel members since this process started.
///
/// Not persisted: a restart empties it, so every user goes through one full
/// membership check per run. Owned by the composition root and injected into
/// the gate, which keeps it mockable and out of global state.
#[derive(Clone, Default)]
pub struct VerifiedCache {
    inner: Arc<Mutex<HashSet<UserId>>>,
}

impl VerifiedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, user_id: UserId) -> bool {
        self.inner.lock().await.contains(&user_id)
    }

    /// Returns true when the user was not present before.
    pub async fn insert(&self, user_id: UserId) -> bool {
        self.inner.lock().await.insert(user_id)
    }

    /// Returns true when the user was present.
    pub async fn remove(&self, user_id: UserId) -> bool {
        self.inner.lock().await.remove(&user_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_contains_remove() {
        let cache = VerifiedCache::new();
        let user = UserId(7);

        assert!(!cache.contains(user).await);
        assert!(cache.insert(user).await);
        assert!(cache.contains(user).await);
        // Second insert reports "already present"
        assert!(!cache.insert(user).await);
        assert_eq!(cache.len().await, 1);

        assert!(cache.remove(user).await);
        assert!(!cache.contains(user).await);
        assert!(!cache.remove(user).await);
    }
}
