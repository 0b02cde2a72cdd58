pub mod completion;
pub mod config;
pub mod error;
pub mod gate;
pub mod io;
pub mod lead;
pub mod questionnaire;
pub mod store;
pub mod webhook;

pub use error::{LeadbotError, Result};
