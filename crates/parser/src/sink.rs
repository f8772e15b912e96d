//! 기본 경고 싱크

use cefpost_core::{FieldWarning, WarningSink};
use tracing::warn;

/// 드롭된 필드를 `tracing` 경고로 기록하는 싱크
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn field_dropped(&self, warning: &FieldWarning) {
        warn!(
            key = %warning.key,
            reason = warning.reason.as_label(),
            "{}",
            warning.reason
        );
    }
}
