//! External application hand-off

/// Opens a URL in a native app. Returning `false` means the app isn't
/// installed or refused; the navigator then loads the URL in-session.
pub trait ExternalLauncher: Send + Sync {
    fn try_launch(&self, app_id: &str, url: &str) -> bool;
}

/// For hosts without external apps: every dispatch falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLauncher;

impl ExternalLauncher for NoopLauncher {
    fn try_launch(&self, _app_id: &str, _url: &str) -> bool {
        false
    }
}
