//! Naming conventions: model type names to table names, foreign keys and pivot tables.

/// Convert a single identifier from CamelCase to snake_case.
/// e.g. "MenuCategory" -> "menu_category", "Courier" -> "courier"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Default table for a model: snake_case name with a trailing "s" ("Category" -> "categorys").
pub fn default_table_name(model: &str) -> String {
    if model.is_empty() {
        return String::new();
    }
    format!("{}s", to_snake_case(model))
}

/// Default foreign key pointing at a model: "Category" -> "category_id".
pub fn foreign_key_for(model: &str) -> String {
    format!("{}_id", to_snake_case(model))
}

/// Default pivot table joining two models: both names snake_cased, sorted, joined with "_".
pub fn pivot_table_for(a: &str, b: &str) -> String {
    let mut names = [to_snake_case(a), to_snake_case(b)];
    names.sort();
    names.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_splits_on_capitals() {
        assert_eq!(to_snake_case("MenuCategory"), "menu_category");
        assert_eq!(to_snake_case("courier"), "courier");
    }

    #[test]
    fn conventions() {
        assert_eq!(default_table_name("Category"), "categorys");
        assert_eq!(default_table_name(""), "");
        assert_eq!(foreign_key_for("Category"), "category_id");
        assert_eq!(pivot_table_for("Courier", "Category"), "category_courier");
        assert_eq!(pivot_table_for("Category", "Courier"), "category_courier");
    }
}
