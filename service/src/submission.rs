//! Submission control of record creation forms.
//!
//! Every form submission moves through the `Idle → Submitting → {Done,
//! Failed}` states. While a submission is in progress (or already done) the
//! same form cannot be submitted again.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

use derive_more::{AsRef, Display};
use regex::Regex;

/// ID of a form submission, provided by the submitting client.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Id`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid regex")
        });

        REGEX.is_match(id.as_ref())
    }
}

impl std::str::FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid submission `Id`")
    }
}

/// State of a form submission.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum State {
    /// Form has not been submitted yet.
    #[default]
    #[display("idle")]
    Idle,

    /// Form is being submitted.
    #[display("submitting")]
    Submitting,

    /// Record has been created.
    ///
    /// Failures of attaching images to the record still end up here.
    #[display("done")]
    Done,

    /// Record creation failed, so the form may be submitted again.
    #[display("failed")]
    Failed,
}

/// Registry tracking [`State`]s of form submissions.
///
/// Only the latest [`Registry::capacity`] finished submissions are remembered,
/// older ones are forgotten and become [`State::Idle`] again. Submissions in
/// progress are never forgotten.
#[derive(Clone, Debug)]
pub struct Registry {
    /// Tracked submissions.
    inner: Arc<Mutex<Tracked>>,

    /// Maximum number of finished submissions to remember.
    capacity: usize,
}

/// Submissions tracked by a [`Registry`].
#[derive(Debug, Default)]
struct Tracked {
    /// [`State`]s of the known submissions.
    states: HashMap<Id, State>,

    /// [`Id`]s of the finished submissions, oldest first.
    finished: VecDeque<Id>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl Registry {
    /// Number of finished submissions a [`Registry::new`] remembers.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a new empty [`Registry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty [`Registry`] remembering at most `capacity`
    /// finished submissions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            capacity,
        }
    }

    /// Returns the maximum number of finished submissions this [`Registry`]
    /// remembers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of submissions this [`Registry`] tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().states.len()
    }

    /// Indicates whether this [`Registry`] tracks no submissions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current [`State`] of the submission with the provided
    /// [`Id`].
    #[must_use]
    pub fn state(&self, id: &Id) -> State {
        self.lock().states.get(id).copied().unwrap_or_default()
    }

    /// Moves the submission with the provided [`Id`] into the
    /// [`State::Submitting`].
    ///
    /// # Errors
    ///
    /// Returns the current [`State`] if it's [`State::Submitting`] or
    /// [`State::Done`], as the submission cannot begin again then.
    pub fn begin(&self, id: Id) -> Result<Guard, State> {
        let mut tracked = self.lock();
        let state = tracked.states.entry(id.clone()).or_default();
        match *state {
            State::Idle => *state = State::Submitting,
            State::Failed => {
                *state = State::Submitting;
                tracked.finished.retain(|f| f != &id);
            }
            s @ (State::Submitting | State::Done) => return Err(s),
        }
        drop(tracked);

        Ok(Guard {
            registry: self.clone(),
            id,
            finished: false,
        })
    }

    /// Finishes the submission with the provided [`Id`] in the given
    /// [`State`], forgetting the oldest finished submissions over the
    /// [`Registry::capacity`].
    fn finish(&self, id: &Id, state: State) {
        let mut tracked = self.lock();
        _ = tracked.states.insert(id.clone(), state);
        tracked.finished.push_back(id.clone());
        while tracked.finished.len() > self.capacity {
            if let Some(oldest) = tracked.finished.pop_front() {
                _ = tracked.states.remove(&oldest);
            }
        }
    }

    /// Locks the [`Tracked`] submissions of this [`Registry`].
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard of a submission in the [`State::Submitting`].
///
/// Moves the submission into the [`State::Failed`] if dropped unfinished.
#[derive(Debug)]
pub struct Guard {
    /// [`Registry`] the submission is tracked in.
    registry: Registry,

    /// [`Id`] of the submission.
    id: Id,

    /// Indicator whether the submission has been finished explicitly.
    finished: bool,
}

impl Guard {
    /// Finishes the submission in the [`State::Done`].
    pub fn done(self) {
        self.finish(State::Done);
    }

    /// Finishes the submission in the [`State::Failed`].
    pub fn fail(self) {
        self.finish(State::Failed);
    }

    /// Finishes the submission in the provided [`State`].
    fn finish(mut self, state: State) {
        self.registry.finish(&self.id, state);
        self.finished = true;
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if !self.finished {
            self.registry.finish(&self.id, State::Failed);
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Id, Registry, State};

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn unknown_submission_is_idle() {
        assert_eq!(Registry::new().state(&id("form-1")), State::Idle);
    }

    #[test]
    fn blocks_duplicate_while_submitting() {
        let registry = Registry::new();
        let guard = registry.begin(id("form-1")).unwrap();

        assert_eq!(registry.state(&id("form-1")), State::Submitting);
        assert_eq!(
            registry.begin(id("form-1")).unwrap_err(),
            State::Submitting,
        );
        assert!(registry.begin(id("form-2")).is_ok());

        guard.done();
        assert_eq!(registry.state(&id("form-1")), State::Done);
    }

    #[test]
    fn done_is_final() {
        let registry = Registry::new();
        registry.begin(id("form-1")).unwrap().done();

        assert_eq!(registry.begin(id("form-1")).unwrap_err(), State::Done);
    }

    #[test]
    fn failed_can_be_retried() {
        let registry = Registry::new();
        registry.begin(id("form-1")).unwrap().fail();
        assert_eq!(registry.state(&id("form-1")), State::Failed);

        let retry = registry.begin(id("form-1")).unwrap();
        assert_eq!(registry.state(&id("form-1")), State::Submitting);
        retry.done();
        assert_eq!(registry.state(&id("form-1")), State::Done);
    }

    #[test]
    fn dropped_guard_fails_submission() {
        let registry = Registry::new();
        drop(registry.begin(id("form-1")).unwrap());

        assert_eq!(registry.state(&id("form-1")), State::Failed);
    }

    #[test]
    fn forgets_oldest_finished_over_capacity() {
        let registry = Registry::with_capacity(2);
        registry.begin(id("form-1")).unwrap().done();
        registry.begin(id("form-2")).unwrap().fail();
        let pending = registry.begin(id("form-3")).unwrap();
        registry.begin(id("form-4")).unwrap().done();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.state(&id("form-1")), State::Idle);
        assert_eq!(registry.state(&id("form-2")), State::Failed);
        assert_eq!(registry.state(&id("form-3")), State::Submitting);
        assert_eq!(registry.state(&id("form-4")), State::Done);

        pending.done();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.state(&id("form-2")), State::Idle);
        assert_eq!(registry.state(&id("form-3")), State::Done);
    }

    #[test]
    fn retried_submission_is_remembered_once() {
        let registry = Registry::with_capacity(2);
        registry.begin(id("form-1")).unwrap().fail();
        registry.begin(id("form-1")).unwrap().done();
        registry.begin(id("form-2")).unwrap().done();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.begin(id("form-1")).unwrap_err(), State::Done);
    }

    #[test]
    fn id_format() {
        assert!(Id::new("2b5e0c1a-form").is_some());
        assert!(Id::new("").is_none());
        assert!(Id::new("with space").is_none());
        assert!(Id::new("x".repeat(129)).is_none());
    }
}
