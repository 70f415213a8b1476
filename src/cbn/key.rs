//! Parent-state keys
//!
//! CPD rows are keyed by the parent states joined with `_`, in parent
//! declaration order. The empty key is the unconditional row. Renderers
//! split on the same separator, so the encoding must stay bit-exact.

pub const KEY_SEPARATOR: &str = "_";
pub const PRIOR_KEY: &str = "";

pub fn encode_key<S: AsRef<str>>(states: &[S]) -> String {
    states
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(KEY_SEPARATOR)
}

/// Pair each parent with its state from `key`.
///
/// Returns `None` when the number of parts does not match the number of
/// parents. State labels containing `_` cannot be told apart from the
/// separator and therefore fail to decode.
pub fn decode_key<'a, P: AsRef<str>>(parents: &'a [P], key: &'a str) -> Option<Vec<(&'a str, &'a str)>> {
    if key == PRIOR_KEY {
        return parents.is_empty().then(Vec::new);
    }
    let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    if parts.len() != parents.len() {
        return None;
    }
    Some(parents.iter().map(|p| p.as_ref()).zip(parts).collect())
}
