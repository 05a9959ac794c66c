//! Identifier casing helpers shared by chain aliasing and code generation.

/// Lower-case the first character, leaving the rest untouched.
///
/// # Examples
///
/// ```
/// use etherlib_types::naming::lower_first;
///
/// assert_eq!(lower_first("Ethereum"), "ethereum");
/// assert_eq!(lower_first("OP Mainnet"), "oP Mainnet");
/// assert_eq!(lower_first(""), "");
/// ```
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split an identifier into words on separators, lower-to-upper boundaries
/// and the end of an acronym (`USDCToken` -> `USDC`, `Token`).
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    let mut prev_upper = false;
    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            prev_upper = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        } else if c.is_lowercase() && prev_upper && current.chars().count() > 1 {
            if let Some(head) = current.pop() {
                words.push(std::mem::take(&mut current));
                current.push(head);
            }
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        prev_upper = c.is_uppercase();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `ERC20 token` -> `Erc20Token`, `balanceOf` -> `BalanceOf`.
pub fn pascal_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|word| upper_first(&word.to_lowercase()))
        .collect()
}

/// `ERC20 token` -> `erc20Token`, `Counter` -> `counter`.
pub fn camel_case(s: &str) -> String {
    lower_first(&pascal_case(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("balanceOf"), "BalanceOf");
        assert_eq!(pascal_case("my_token-v2"), "MyTokenV2");
        assert_eq!(pascal_case("Counter"), "Counter");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("CounterAbi"), "counterAbi");
        assert_eq!(camel_case("ERC20"), "erc20");
    }

    #[test]
    fn test_acronym_boundary() {
        assert_eq!(words("USDCToken"), vec!["USDC", "Token"]);
        assert_eq!(camel_case("USDCToken"), "usdcToken");
        assert_eq!(pascal_case("parseHTTPResponse"), "ParseHttpResponse");
        assert_eq!(camel_case("ERC20Permit"), "erc20Permit");
    }
}
