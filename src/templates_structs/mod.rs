// Template context structures for Askama templates and JSON bodies, organized by page.
// All types are re-exported: `use careerdesk::templates_structs::*`

mod admin;
mod api;
mod common;
mod intake;

pub use admin::*;
pub use api::*;
pub use common::*;
pub use intake::*;
