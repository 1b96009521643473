//! Schema version bookkeeping.

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// All schema versions, in application order
pub const MIGRATION_VERSIONS: &[i32] = &[1];

/// Versions newer than `current_version`, in application order; an
/// up-to-date database yields an empty list and no migration runs
pub fn pending_migrations(current_version: i32) -> Vec<i32> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_migrations() {
        assert_eq!(pending_migrations(0), vec![1]);
        assert_eq!(pending_migrations(CURRENT_SCHEMA_VERSION), Vec::<i32>::new());
    }
}
