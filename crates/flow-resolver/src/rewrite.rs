//! Import rewriting.
//!
//! Rewriting is textual so that comments and formatting survive: for every binding,
//! the first occurrence of the quoted location `"<location>"` is replaced by the bound
//! address as a `0x`-prefixed hex literal. Later occurrences of the same literal are
//! left alone, so a program that imports one location twice only gets its first
//! import rewritten.

use flow_deployer_types::Address;

/// Replace the first `"<location>"` literal of each binding with its address.
///
/// Pure: depends only on `code` and `bindings`. Because substituted addresses contain
/// no quotes, the order of `bindings` does not change the result as long as no two
/// bindings share a location.
///
/// ```
/// use flow_deployer_types::Address;
/// use flow_resolver::rewrite::replace_imports;
///
/// let code = r#"import FT from "FungibleToken""#;
/// let ft = Address::from_hex("ee82856bf20e2aa6").unwrap();
/// assert_eq!(
///     replace_imports(code, [("FungibleToken", ft)]),
///     "import FT from 0xee82856bf20e2aa6"
/// );
/// ```
pub fn replace_imports<'a, I>(code: &str, bindings: I) -> String
where
    I: IntoIterator<Item = (&'a str, Address)>,
{
    bindings
        .into_iter()
        .fold(code.to_string(), |code, (location, address)| {
            code.replacen(&format!("\"{}\"", location), &address.to_hex_literal(), 1)
        })
}
