/// A local mutation applied ahead of backend confirmation.
///
/// `apply` records a snapshot and mutates in place; the caller later either
/// `commit`s (the mutation stands) or `rollback`s onto wherever the value
/// lives by then.
#[derive(Debug)]
#[must_use = "an optimistic update must be committed or rolled back"]
pub struct Optimistic<S> {
    snapshot: S,
}

impl<S: Clone> Optimistic<S> {
    pub fn apply(state: &mut S, mutate: impl FnOnce(&mut S)) -> Self {
        let snapshot = state.clone();
        mutate(state);
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    pub fn commit(self) {}

    pub fn rollback(self, state: &mut S) {
        *state = self.snapshot;
    }
}
