//! Utility functions for id minting and money formatting

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique document id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Render a whole-peso amount the way the COP locale does, with dot
/// thousand separators and no decimals. Older records may lack the
/// derived fields, those render as an em dash.
pub fn format_cop(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "—".to_string();
    };

    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("$ {grouped}")
}
