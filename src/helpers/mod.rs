//! Helper functions shared by the loader, the generator and the templates

mod date;
mod html;
mod reading;
mod url;

pub use date::*;
pub use html::*;
pub use reading::*;
pub use url::*;
