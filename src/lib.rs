pub mod characters;
pub mod config;
pub mod error;
pub mod processing {
    pub mod color;
    pub mod layout;
    pub mod patterns;
    pub mod wrap;
}
pub mod render {
    pub mod compose;
    pub mod metrics;
    pub mod surface;
}

pub use card_catalog as catalog;
pub use error::{Error, Result};
