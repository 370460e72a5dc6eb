/// Error type shared by league backend implementations.
pub mod backend;
/// League backend abstraction and its REST implementation.
pub mod league_backend;
/// Wire models exchanged with the league backend.
pub mod models;
