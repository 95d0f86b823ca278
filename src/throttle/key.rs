//! Identity key generation for throttle buckets.

/// Separator placed between the channel and each context part.
pub const KEY_SEPARATOR: &str = "/";

/// A key that uniquely identifies a throttle bucket.
///
/// The key is the channel followed by every context part, in order, joined
/// with [`KEY_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey(String);

impl ThrottleKey {
    /// Build the key for a channel and its ordered context parts.
    pub fn new(channel: &str, parts: &[&str]) -> Self {
        let mut key = String::with_capacity(
            channel.len() + parts.iter().map(|p| p.len() + KEY_SEPARATOR.len()).sum::<usize>(),
        );
        key.push_str(channel);
        for part in parts {
            key.push_str(KEY_SEPARATOR);
            key.push_str(part);
        }
        Self(key)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThrottleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
