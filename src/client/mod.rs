pub mod blocking;
pub mod builder;
pub mod error;
pub mod lookup;
mod url;

pub use builder::ClientBuilder;
pub use error::{FetchFailure, LookupError};
pub use lookup::{LookupClient, LookupMetadata};
