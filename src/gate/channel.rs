use teloxide::types::{ChatId, Recipient};

/// Channel reference from configuration.
///
/// The raw value may be a numeric chat id (`-1001234567890`) or a public
/// handle (`@mychannel` / `mychannel`); it is parsed exactly once at startup
/// and carried as a tagged value from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(ChatId),
    Handle(String),
}

impl ChannelRef {
    /// Returns `None` for an empty value, i.e. gate disabled.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(handle) = raw.strip_prefix('@') {
            return Some(Self::Handle(handle.to_string()));
        }
        match raw.parse::<i64>() {
            Ok(id) => Some(Self::Id(ChatId(id))),
            Err(_) => Some(Self::Handle(raw.to_string())),
        }
    }

    pub fn recipient(&self) -> Recipient {
        match self {
            Self::Id(id) => Recipient::Id(*id),
            Self::Handle(handle) => Recipient::ChannelUsername(format!("@{}", handle)),
        }
    }

    /// Best-effort t.me link used when the provider refuses to hand out an
    /// invite link. Supergroup/channel ids drop their `-100` prefix.
    pub fn deep_link(&self) -> String {
        match self {
            Self::Id(ChatId(id)) => {
                let raw = id.to_string();
                match raw.strip_prefix("-100") {
                    Some(internal) => format!("https://t.me/c/{}", internal),
                    None => format!("https://t.me/{}", raw),
                }
            }
            Self::Handle(handle) => format!("https://t.me/{}", handle),
        }
    }
}
