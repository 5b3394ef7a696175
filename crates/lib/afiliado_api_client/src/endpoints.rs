//! REST paths, relative to the API base URL.

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const PRODUCTS: &str = "/products";

/// `/products/{id}`.
pub fn product(id: i64) -> String {
    format!("{PRODUCTS}/{id}")
}

/// `/products` with an optional query string.
pub fn products_query(query: &str) -> String {
    if query.is_empty() {
        PRODUCTS.to_string()
    } else {
        format!("{PRODUCTS}?{query}")
    }
}
