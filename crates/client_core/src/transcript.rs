use std::{sync::Arc, time::Duration};

use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use shared::protocol::{ChatEntry, ChatRole};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;

pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(20);

/// Ordered chat history; entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatEntry {
        self.push(ChatEntry::user(content))
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ChatEntry {
        self.push(ChatEntry::assistant(content))
    }

    fn push(&mut self, entry: ChatEntry) -> &ChatEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_role(&self, role: ChatRole) -> usize {
        self.entries.iter().filter(|e| e.role == role).count()
    }

    /// Starts a fresh conversation; only used when the document is discarded.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Takes back the newest entry, e.g. a question that was never sent.
    pub(crate) fn pop_last(&mut self) -> Option<ChatEntry> {
        self.entries.pop()
    }
}

/// Yields growing prefixes of `text`, one character per `delay`, ending with
/// the full text. Purely cosmetic: it reads a copy and never touches a
/// transcript.
pub fn typing_reveal(text: impl Into<String>, delay: Duration) -> BoxStream<'static, String> {
    let text: Arc<str> = Arc::from(text.into());
    let ends: Vec<usize> = text
        .char_indices()
        .map(|(idx, ch)| idx + ch.len_utf8())
        .collect();

    if delay.is_zero() {
        return stream::iter(ends)
            .map(move |end| text[..end].to_string())
            .boxed();
    }

    let mut ticker = interval_at(Instant::now() + delay, delay);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    IntervalStream::new(ticker)
        .zip(stream::iter(ends))
        .map(move |(_, end)| text[..end].to_string())
        .boxed()
}
