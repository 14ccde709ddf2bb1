/// Performs screen transitions decided by the core.
///
/// Implementations replace the current screen (no back entry), matching how
/// redirects behave in the UI router.
pub trait NavigatorPort: Send + Sync {
    fn replace(&self, path: &str);
}
