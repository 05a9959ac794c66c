//! Helpers shared by the TypeScript generators.

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Serialize;

use etherlib_core::APP_NAME;
use etherlib_types::naming::camel_case;

pub(crate) fn banner() -> String {
    format!("// Generated by {APP_NAME}. Do not edit.")
}

/// `Counter` -> `counterAbi`.
pub(crate) fn abi_ident(contract: &str) -> String {
    format!("{}Abi", camel_case(contract))
}

pub(crate) fn to_ts_literal(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Every contract name must map to its own TypeScript identifier and be
/// safe inside a single-quoted string.
pub(crate) fn check_contract_names<'a>(
    names: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    let mut idents: HashMap<String, &str> = HashMap::new();
    for name in names {
        if name.contains(['\'', '\\', '\n', '\r']) {
            bail!("Contract name \"{name}\" cannot be used in generated code.");
        }
        let ident = camel_case(name);
        if !ident.starts_with(|c: char| c.is_alphabetic()) {
            bail!("Contract name \"{name}\" does not start with a letter.");
        }
        if let Some(other) = idents.insert(ident.clone(), name) {
            bail!("Contracts \"{other}\" and \"{name}\" both generate `{ident}Abi`.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(names: &[&str]) -> Result<()> {
        let names: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        check_contract_names(&names)
    }

    #[test]
    fn test_distinct_identifiers_pass() {
        check(&["Counter", "ERC20", "USDCToken", "my_vault"]).unwrap();
        assert_eq!(abi_ident("USDCToken"), "usdcTokenAbi");
    }

    #[test]
    fn test_rejected_names() {
        for (names, message) in [
            (&["Token", "token"][..], "both generate `tokenAbi`"),
            (&["my_token", "MyToken"][..], "both generate `myTokenAbi`"),
            (&["1inchRouter"][..], "does not start with a letter"),
            (&["__"][..], "does not start with a letter"),
            (&["O'Brien"][..], "cannot be used in generated code"),
        ] {
            let err = check(names).unwrap_err();
            assert!(err.to_string().contains(message), "{err}");
        }
    }
}
