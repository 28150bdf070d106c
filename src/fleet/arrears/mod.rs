pub mod error;
pub mod extract;
pub mod fields;
pub mod header;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use error::{ExtractError, Result};
