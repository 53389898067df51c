use cartograph_core::Cartographer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub cartographer: Cartographer,
}
