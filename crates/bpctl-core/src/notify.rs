//! Operator-facing output channels.

use crate::Warnings;

/// Receives informational lines and advisory warnings.
///
/// Ordering is guaranteed within each channel but not across them.
pub trait Notifier: Send + Sync {
    fn info(&self, line: &str);

    fn warn(&self, line: &str);

    /// Emit every warning in order on the warning channel.
    fn warnings(&self, warnings: &Warnings) {
        for warning in warnings {
            self.warn(warning);
        }
    }
}
