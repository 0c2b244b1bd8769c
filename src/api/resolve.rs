//! `{id}` path parameter resolution.

use crate::error::ApiError;
use crate::store::{Resolved, Users};

/// Reads a leading base-10 integer the lenient way: leading whitespace
/// is skipped, a `+` sign is allowed, and anything after the digits is
/// ignored (`"12abc"` is 12). Negative, digit-less or overflowing input has
/// no value.
pub fn parse_id(raw: &str) -> Option<u64> {
    let rest = raw.trim_start();
    let rest = rest.strip_prefix('+').unwrap_or(rest);
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Finds the position of the user named by the raw `id` parameter.
///
/// Every way of failing, unparsable input included, is
/// [`ApiError::NotFound`].
pub fn resolve(users: &Users, raw: Option<&str>) -> Result<Resolved, ApiError> {
    raw.and_then(parse_id)
        .and_then(|id| users.find(id))
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn parses_plain_and_prefixed_integers() {
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id("  +3"), Some(3));
        assert_eq!(parse_id("12abc"), Some(12));
        assert_eq!(parse_id("1.5"), Some(1));
    }

    #[test]
    fn rejects_what_has_no_leading_digits() {
        for raw in ["", "abc", "-1", "+", "x12", "99999999999999999999999"] {
            assert_eq!(parse_id(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn resolves_to_the_current_position() {
        let store = Store::seeded();
        let mut users = store.users().unwrap();
        assert_eq!(resolve(&users, Some("3")).unwrap().index(), 2);

        let first = resolve(&users, Some("1")).unwrap();
        users.remove(first);
        assert_eq!(resolve(&users, Some("3")).unwrap().index(), 1);
        assert!(matches!(resolve(&users, Some("1")), Err(ApiError::NotFound)));
    }

    #[test]
    fn missing_or_garbage_ids_are_not_found() {
        let store = Store::seeded();
        let users = store.users().unwrap();
        assert!(matches!(resolve(&users, None), Err(ApiError::NotFound)));
        assert!(matches!(resolve(&users, Some("jack")), Err(ApiError::NotFound)));
        assert!(matches!(resolve(&users, Some("1000")), Err(ApiError::NotFound)));
    }
}
