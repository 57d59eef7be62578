pub mod dirty;
pub mod drafts;
pub mod seo;

pub use dirty::*;
pub use drafts::*;
pub use seo::*;
