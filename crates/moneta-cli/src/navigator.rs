use moneta_core::Navigator;

/// The terminal has no login screen to move to, so the redirect becomes a
/// hint on stderr.
#[derive(Debug, Default)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Session ended. Run `moneta login` to sign in.");
    }
}
