//! Mechanical conversion between wire (lowerCamelCase) and internal
//! (snake_case) key spellings. No table, no exceptions — every RPC-visible
//! field name round-trips through these two functions.

/// `resource_locator` -> `resourceLocator`.
pub fn to_camel_case(snake: &str) -> String {
    let mut parts = snake.split('_');
    let mut out = String::with_capacity(snake.len());

    if let Some(first) = parts.next() {
        out.push_str(&first.to_lowercase());
    }

    for part in parts {
        let mut chars = part.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }

    out
}

/// `resourceLocator` -> `resource_locator`.
pub fn to_snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    let chars: Vec<char> = camel.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            if prev.is_lowercase() || prev.is_ascii_digit() {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_round_trips_through_snake_case() {
        for key in ["resourceLocator", "apiVersion", "sampleCount", "catalogId"] {
            assert_eq!(to_camel_case(&to_snake_case(key)), key);
        }
    }

    #[test]
    fn snake_to_camel_handles_single_segment() {
        assert_eq!(to_camel_case("begin"), "begin");
    }

    #[test]
    fn snake_to_camel_title_cases_each_subsequent_segment() {
        assert_eq!(to_camel_case("sample_period"), "samplePeriod");
        assert_eq!(to_camel_case("element_size"), "elementSize");
        assert_eq!(to_camel_case("is_leaf"), "isLeaf");
    }

    #[test]
    fn camel_to_snake_inserts_underscore_before_uppercase_after_lowercase() {
        assert_eq!(to_snake_case("resourceLocator"), "resource_locator");
        assert_eq!(to_snake_case("apiVersion"), "api_version");
    }

    #[test]
    fn camel_to_snake_inserts_underscore_after_digit() {
        assert_eq!(to_snake_case("catalogId1Name"), "catalog_id1_name");
    }

    #[test]
    fn camel_to_snake_leaves_already_lowercase_untouched() {
        assert_eq!(to_snake_case("begin"), "begin");
    }
}
