use thiserror::Error;

use crate::html::HtmlParseError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("the {0} field is required")]
    Required(&'static str),
    #[error("markup is not well-formed ({} parse error(s))", .0.len())]
    Markup(Vec<HtmlParseError>),
}
