//! TUI Widgets
//!
//! Custom widgets for the analyzer form.

mod form;
mod result;

pub use form::{render_form, FIELD_HEIGHT};
pub use result::{content_height, render_result, result_inner, result_lines};
