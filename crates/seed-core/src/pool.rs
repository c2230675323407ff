//! Id pools: primary keys read back from committed tables.

use crate::schema::Table;
use std::collections::HashMap;

/// Primary keys available per table at a given seeding phase.
///
/// Pools are only ever filled from ids fetched from the store after a
/// commit, so every id in a pool references an existing row.
#[derive(Debug, Clone, Default)]
pub struct IdPools {
    pools: HashMap<Table, Vec<i64>>,
}

impl IdPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pool for `table`.
    pub fn publish(&mut self, table: Table, ids: Vec<i64>) {
        self.pools.insert(table, ids);
    }

    /// Ids for `table`, empty if the table has not been published yet.
    pub fn get(&self, table: Table) -> &[i64] {
        self.pools.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, table: Table) -> usize {
        self.get(table).len()
    }

    pub fn contains(&self, table: Table) -> bool {
        self.pools.contains_key(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_replaces() {
        let mut pools = IdPools::new();
        assert!(pools.get(Table::Zona).is_empty());
        assert!(!pools.contains(Table::Zona));

        pools.publish(Table::Zona, vec![1, 2, 3]);
        assert_eq!(pools.len(Table::Zona), 3);

        pools.publish(Table::Zona, vec![9]);
        assert_eq!(pools.get(Table::Zona), &[9]);
    }
}
