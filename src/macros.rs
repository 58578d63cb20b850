/// Compiles a CSS selector once and hands out a `&'static Selector`.
#[macro_export]
macro_rules! selector {
    ($selector: expr) => {{
        static SELECTOR: ::once_cell::sync::Lazy<::scraper::Selector> =
            ::once_cell::sync::Lazy::new(|| ::scraper::Selector::parse($selector).unwrap());
        &*SELECTOR
    }};
}

/// Compiles a regular expression once and hands out a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($pattern: expr) => {{
        static PATTERN: ::once_cell::sync::Lazy<::regex::Regex> =
            ::once_cell::sync::Lazy::new(|| ::regex::Regex::new($pattern).unwrap());
        &*PATTERN
    }};
}
