//! Form requests accepted by the REST surface.

use crate::service::{FormRequest, Sanitizer};

/// Body of create and update category calls.
pub struct StoreCategoryRequest;

impl FormRequest for StoreCategoryRequest {
    fn rules() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "required|string|max:255"),
            ("description", "required|string|max:500"),
            ("branch_id", "required|string"),
        ]
    }

    fn messages() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name.required", "Category name is required."),
            ("name.string", "Category name must be a string."),
            ("name.max", "Category name must not exceed 255 characters."),
            ("description.string", "Description must be a string."),
            ("description.max", "Description must not exceed 500 characters."),
            ("branch_id.required", "Branch id is required."),
            ("branch_id.string", "Branch id must be an string."),
        ]
    }

    fn sanitizers() -> Vec<(&'static str, Sanitizer)> {
        vec![
            ("name", Sanitizer::Text),
            ("description", Sanitizer::Textarea),
            ("branch_id", Sanitizer::Text),
        ]
    }
}
