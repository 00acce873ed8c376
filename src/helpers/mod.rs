//! Small formatting helpers shared by templates and the generator.

pub mod date;
pub mod html;
pub mod url;
