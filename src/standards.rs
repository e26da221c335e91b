//! Expansion of `-std` tokens into the concrete standards to test.

/// Supported C++ standards, oldest first.
pub const SUPPORTED_STANDARDS: [&str; 5] = ["c++98", "c++11", "c++14", "c++17", "c++20"];

const OR_LATER: &str = "-or-later";

/// Expands `<std>-or-later` against [`SUPPORTED_STANDARDS`].
///
/// Any other token, including `-or-later` forms of unknown versions, is
/// returned unchanged as a single concrete standard.
pub fn expand_standard(token: &str) -> Vec<String> {
    expand_with(token, &SUPPORTED_STANDARDS)
}

/// Like [`expand_standard`] but against an arbitrary ascending version list.
pub fn expand_with(token: &str, supported: &[&str]) -> Vec<String> {
    if let Some(base) = token.strip_suffix(OR_LATER) {
        if let Some(start) = supported.iter().position(|s| *s == base) {
            return supported[start..].iter().map(|s| s.to_string()).collect();
        }
    }
    vec![token.to_string()]
}

/// Flattens every configured token into one ordered list of runs.
pub fn expand_all(tokens: &[String]) -> Vec<String> {
    tokens.iter().flat_map(|t| expand_standard(t)).collect()
}
