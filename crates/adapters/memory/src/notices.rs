//! Notice recorder.

use otp_autofill_core::traits::NoticeSink;
use otp_autofill_core::types::{NoticeKind, UserNotice};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every notice instead of rendering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNoticeSink {
    shown: Arc<Mutex<Vec<UserNotice>>>,
}

impl RecordingNoticeSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notice shown so far.
    pub fn shown(&self) -> Vec<UserNotice> {
        self.shown.lock().clone()
    }

    /// Counts notices of one kind.
    pub fn count(&self, kind: NoticeKind) -> usize {
        self.shown.lock().iter().filter(|n| n.kind == kind).count()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn show(&self, notice: &UserNotice) {
        self.shown.lock().push(notice.clone());
    }
}
