use std::cell::Cell;

use uuid::Uuid;

/// Source of opaque identifiers for wallets, conditions and exit routes.
pub trait IdGenerator {
    fn new_id(&self) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` ids, handy for tests and reproducible demos.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        let value = self.next.get();
        self.next.set(value + 1);
        format!("{}-{value}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("w");
        assert_eq!(ids.new_id(), "w-1");
        assert_eq!(ids.new_id(), "w-2");
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let ids = UuidIds;
        assert_ne!(ids.new_id(), ids.new_id());
    }
}
