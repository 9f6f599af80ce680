/// Moves the user to the unauthenticated entry point.
///
/// Invoked by the API client after a failed token renewal and on logout.
/// The client has already cleared the stored tokens when this runs.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Navigator that does nothing; for headless callers that only inspect the
/// credential store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}
