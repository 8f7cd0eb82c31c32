//! Node id generation.
//!
//! Ids are opaque strings; the only requirement is uniqueness within one tree. Callers that need
//! reproducible output (tests, fixtures) inject [`SequentialIdGenerator`].

use uuid::Uuid;

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random `id-<uuid>` ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        format!("id-{}", Uuid::new_v4().simple())
    }
}

/// `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

/// Draws ids until one is not rejected by `taken`.
///
/// Generators are not required to know what is already in a tree (persisted trees may have been
/// produced by a different generator), so insertion sites filter collisions here.
pub fn fresh_id(ids: &mut dyn IdGenerator, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = ids.next_id();
        if !id.is_empty() && !taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_deterministic() {
        let mut ids = SequentialIdGenerator::new("n");
        assert_eq!(ids.next_id(), "n-1");
        assert_eq!(ids.next_id(), "n-2");
    }

    #[test]
    fn fresh_id_skips_taken_values() {
        let mut ids = SequentialIdGenerator::new("n");
        let id = fresh_id(&mut ids, |id| id == "n-1" || id == "n-2");
        assert_eq!(id, "n-3");
    }

    #[test]
    fn uuid_ids_are_prefixed_and_distinct() {
        let mut ids = UuidIdGenerator;
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.starts_with("id-"));
        assert_ne!(a, b);
    }
}
