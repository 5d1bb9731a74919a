use serde::Serialize;

/// Severity of a user-visible notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

/// A toast-style notification for the user.
///
/// `seq` is assigned by the [`NoticeBoard`] and increases monotonically so the
/// host page can de-duplicate re-rendered notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub seq: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending notices, in emission order, until the page drains them.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    next_seq: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let message = message.into();
        tracing::debug!(seq, level = level.as_str(), %message, "notice");
        self.notices.push(Notice {
            seq,
            level,
            message,
        });
        seq
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
