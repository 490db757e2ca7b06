use super::Dashboard;
use crate::error::Result;

/// Encodes a dashboard as pretty-printed JSON (two-space indent) with a
/// trailing newline.
///
/// The encoding is deterministic: object fields follow struct declaration
/// order and mapping keys are BTreeMap-sorted, so the same dashboard always
/// produces the same bytes and decode→re-encode is lossless.
pub fn to_bytes(dashboard: &Dashboard) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(dashboard)?;
    bytes.push(b'\n');
    Ok(bytes)
}
