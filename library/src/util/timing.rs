use std::borrow::Cow;
use std::time::Instant;

use log::{self, Level};

/// Logs how long it lived when dropped.
///
/// Used around evaluation passes when debug logging is switched on.
pub struct ScopedTimer {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    pub fn with_level(label: impl Into<Cow<'static, str>>, level: Level) -> Self {
        Self {
            label: label.into(),
            level,
            start: Instant::now(),
        }
    }

    pub fn debug(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_level(label, Level::Debug)
    }

    pub fn elapsed_micros(&self) -> u128 {
        self.start.elapsed().as_micros()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::log!(
            self.level,
            "{} took {} us",
            self.label,
            self.elapsed_micros()
        );
    }
}
