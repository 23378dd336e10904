use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::feedback::FeedbackRecord;
use crate::posts::NormalizedPost;

/// One record waiting in the durable queue. Serialized with a `kind`
/// discriminator next to the wrapped record's own fields.
///
/// Anything stored under the queue key that does not parse as a tagged
/// record (an item written by an older build, say) is carried as
/// [`QueueEntry::Opaque`] and written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    Post(NormalizedPost),
    Feedback(FeedbackRecord),
    Opaque(Value),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Tagged {
    Post(NormalizedPost),
    Feedback(FeedbackRecord),
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedRef<'a> {
    Post(&'a NormalizedPost),
    Feedback(&'a FeedbackRecord),
}

impl QueueEntry {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            QueueEntry::Post(_) => "post",
            QueueEntry::Feedback(_) => "feedback",
            QueueEntry::Opaque(_) => "opaque",
        }
    }

    /// Reads a stored item. Never fails: unrecognised shapes become
    /// [`QueueEntry::Opaque`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match Tagged::deserialize(&value) {
            Ok(Tagged::Post(post)) => QueueEntry::Post(post),
            Ok(Tagged::Feedback(record)) => QueueEntry::Feedback(record),
            Err(_) => QueueEntry::Opaque(value),
        }
    }
}

impl Serialize for QueueEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueueEntry::Post(post) => TaggedRef::Post(post).serialize(serializer),
            QueueEntry::Feedback(record) => TaggedRef::Feedback(record).serialize(serializer),
            QueueEntry::Opaque(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for QueueEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(QueueEntry::from_value)
    }
}

impl From<NormalizedPost> for QueueEntry {
    fn from(post: NormalizedPost) -> Self {
        QueueEntry::Post(post)
    }
}

impl From<FeedbackRecord> for QueueEntry {
    fn from(record: FeedbackRecord) -> Self {
        QueueEntry::Feedback(record)
    }
}
