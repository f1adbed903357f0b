//! Request validation, input sanitizing and the category resource.

mod category;
mod sanitize;
mod validation;

pub use category::CategoryResource;
pub use sanitize::Sanitizer;
pub use validation::{validate, FormRequest, RequestValidator, Rule, ValidationErrors};
