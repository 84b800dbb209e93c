mod error;
pub mod spotify;
mod traits;
mod types;

pub use error::CatalogError;
pub use spotify::SpotifyCatalog;
pub use traits::Catalog;
pub use types::*;
