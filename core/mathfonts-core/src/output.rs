//! Streaming output helpers

use std::io::Write;

use anyhow::Result;

use crate::face::FontFaceRule;

/// Write a stylesheet verbatim, without adding a trailing newline.
pub fn write_css(css: &str, mut w: impl Write) -> Result<()> {
    w.write_all(css.as_bytes())?;
    Ok(())
}

/// Write rules as prettified JSON array.
pub fn write_json_pretty(rules: &[FontFaceRule], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(rules)?;
    w.write_all(json.as_bytes())?;
    Ok(())
}

/// Write rules as newline-delimited JSON (NDJSON).
pub fn write_ndjson(rules: &[FontFaceRule], mut w: impl Write) -> Result<()> {
    for rule in rules {
        let line = serde_json::to_string(rule)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
