mod client;
mod error;

pub use client::RestLeagueBackend;
pub use error::{RestDaoError, RestResult};
