use crate::traits::Notifier;

/// [`Notifier`] that forwards to `tracing`. The default when the host
/// doesn't wire up its own notification surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!(target: "varex", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "varex", "{message}");
    }
}
