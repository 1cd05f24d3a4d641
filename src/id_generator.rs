use uuid::Uuid;

/// Source of unique feature ids. Owned by whoever creates features so id
/// minting stays injectable and tests stay deterministic.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Default id source: random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic counter source producing `feature-1`, `feature-2`, ...
/// Useful wherever stable ids matter (tests, fixtures).
#[derive(Debug, Default)]
pub struct SequentialSource {
    next: usize,
}

impl SequentialSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialSource {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("feature-{}", self.next)
    }
}
