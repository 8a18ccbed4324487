//! UUID v7 utilities for time-ordered identifiers.
//!
//! Note IDs are UUIDv7: the first 48 bits embed a Unix millisecond timestamp,
//! so identifiers sort chronologically and index locality follows insert
//! order.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// IDs generated later are lexicographically greater, which keeps the
/// `notes` primary key time-ordered without a separate sequence.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        assert_eq!(new_v7().get_version_num(), 7);
    }

    #[test]
    fn test_new_v7_is_time_ordered() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(a < b);
    }
}
