// Core rules, persistence seam, and host coordinator for the Chor Police
// party game. Rendering and the realtime transport live elsewhere.

pub mod config;
pub mod host;
pub mod state;
pub mod store;
pub mod types;
