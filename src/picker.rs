//! Random pick of an unused entry. A pick spins through a fixed number of
//! animation steps, then settles on an independent final draw and marks that
//! entry used in the store exactly once.
//!
//! Time is supplied by the caller as [`Instant`]s, so the event loop decides
//! when to poll and tests can drive the whole sequence synchronously.

use std::time::{Duration, Instant};

use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::db::{EntryStore, StoreError};
use crate::models::Entry;

/// Animation steps shown before the pick settles.
pub const SPIN_STEPS: u32 = 20;
/// Gap between two animation steps.
pub const SPIN_INTERVAL: Duration = Duration::from_millis(50);
/// Pause between the last animation step and the final draw.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for ThreadRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Map a unit sample onto `0..len` as `floor(unit * len)`. Every index is
/// equally likely when `unit` is uniform. `len` must be non-zero.
pub fn uniform_index(len: usize, unit: f64) -> usize {
    debug_assert!(len > 0, "cannot sample from an empty candidate list");
    let index = (unit * len as f64).floor() as usize;
    index.min(len.saturating_sub(1))
}

fn sample<'a, R: RandomSource + ?Sized>(candidates: &'a [Entry], rng: &mut R) -> &'a Entry {
    &candidates[uniform_index(candidates.len(), rng.next_unit())]
}

/// Restricts the pool of candidates to one category, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category_id) => entry.category_id == *category_id,
        }
    }
}

/// Unused entries that pass `filter`, in their input order.
pub fn available_candidates(entries: &[Entry], filter: &CategoryFilter) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| !entry.is_used() && filter.matches(entry))
        .cloned()
        .collect()
}

/// Make a used entry eligible for future picks again.
pub fn restore(store: &dyn EntryStore, id: &str) -> Result<(), StoreError> {
    store.set_used(id, false)?;
    info!(id, "entry restored");
    Ok(())
}

/// Shape of the pick animation. [`Default`] gives the standard 20 × 50 ms
/// spin followed by a 100 ms settle before the final draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinTiming {
    pub steps: u32,
    pub interval: Duration,
    pub settle_delay: Duration,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            steps: SPIN_STEPS,
            interval: SPIN_INTERVAL,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// What a [`SpinTicker`] reports when one of its deadlines passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The n-th animation step, counting from 1.
    Step(u32),
    /// The final event; the ticker is finished afterwards.
    Settle,
}

/// Emits `steps` animation ticks `interval` apart followed by one settle tick
/// `settle_delay` later, then stops. Deadlines are scheduled from the previous
/// deadline rather than from the poll time, so a late poll catches up instead
/// of stretching the animation.
#[derive(Debug, Clone)]
pub struct SpinTicker {
    timing: SpinTiming,
    emitted: u32,
    next_due: Option<Instant>,
}

impl SpinTicker {
    pub fn start(now: Instant, timing: SpinTiming) -> Self {
        let first_gap = if timing.steps == 0 {
            timing.settle_delay
        } else {
            timing.interval
        };
        Self {
            timing,
            emitted: 0,
            next_due: Some(now + first_gap),
        }
    }

    /// Return the next due event, if any. Call repeatedly until `None` to
    /// drain every event that has come due by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<TickEvent> {
        let due = self.next_due?;
        if now < due {
            return None;
        }

        if self.emitted < self.timing.steps {
            self.emitted += 1;
            let gap = if self.emitted == self.timing.steps {
                self.timing.settle_delay
            } else {
                self.timing.interval
            };
            self.next_due = Some(due + gap);
            Some(TickEvent::Step(self.emitted))
        } else {
            self.next_due = None;
            Some(TickEvent::Settle)
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

}

/// Where a [`Picker`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    /// Nothing drawn yet, or the last pick was abandoned.
    Idle,
    /// Animation frames are being shown; nothing is committed.
    Spinning,
    /// The final draw happened and the store was asked to mark it used.
    Settled,
}

/// Picker state for one client. Only one pick can be in flight at a time.
#[derive(Debug)]
pub struct Picker {
    timing: SpinTiming,
    filter: CategoryFilter,
    phase: PickerPhase,
    candidates: Vec<Entry>,
    display: Option<Entry>,
    result: Option<Entry>,
    ticker: Option<SpinTicker>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::with_timing(SpinTiming::default())
    }
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timing(timing: SpinTiming) -> Self {
        Self {
            timing,
            filter: CategoryFilter::All,
            phase: PickerPhase::Idle,
            candidates: Vec::new(),
            display: None,
            result: None,
            ticker: None,
        }
    }

    pub fn phase(&self) -> PickerPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == PickerPhase::Spinning
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// The entry currently on screen: an animation frame while spinning, the
    /// committed result once settled.
    pub fn display(&self) -> Option<&Entry> {
        self.display.as_ref()
    }

    pub fn result(&self) -> Option<&Entry> {
        self.result.as_ref()
    }

    /// Change the category filter. Any pick in progress is abandoned and the
    /// picker goes back to idle.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if self.is_spinning() {
            debug!("filter changed mid-spin, abandoning pick");
        }
        self.filter = filter;
        self.reset();
    }

    /// Begin a pick over `candidates`. Used entries are dropped first; when
    /// nothing is left, or a pick is already spinning, nothing happens and
    /// `false` is returned.
    pub fn start(&mut self, mut candidates: Vec<Entry>, now: Instant) -> bool {
        if self.is_spinning() {
            return false;
        }
        candidates.retain(|entry| !entry.is_used());
        if candidates.is_empty() {
            return false;
        }

        self.reset();
        debug!(candidates = candidates.len(), "pick started");
        self.candidates = candidates;
        self.phase = PickerPhase::Spinning;
        self.ticker = Some(SpinTicker::start(now, self.timing));
        true
    }

    /// Process every tick due by `now`. Animation steps only change the
    /// displayed entry. The settle tick draws the result, moves to
    /// [`PickerPhase::Settled`] and marks the result used; that entry is
    /// returned. A store failure is returned as an error but the picker stays
    /// settled on the drawn entry.
    pub fn advance<R: RandomSource + ?Sized>(
        &mut self,
        now: Instant,
        rng: &mut R,
        store: &dyn EntryStore,
    ) -> Result<Option<Entry>, StoreError> {
        let Some(ticker) = self.ticker.as_mut() else {
            return Ok(None);
        };

        while let Some(event) = ticker.poll(now) {
            match event {
                TickEvent::Step(_) => {
                    self.display = Some(sample(&self.candidates, rng).clone());
                }
                TickEvent::Settle => {
                    let chosen = sample(&self.candidates, rng).clone();
                    self.ticker = None;
                    self.phase = PickerPhase::Settled;
                    self.display = Some(chosen.clone());
                    self.result = Some(chosen.clone());
                    self.candidates.clear();

                    if let Err(err) = store.set_used(&chosen.id, true) {
                        warn!(id = %chosen.id, error = %err, "failed to mark pick as used");
                        return Err(err);
                    }
                    info!(id = %chosen.id, label = %chosen.label, "entry picked");
                    return Ok(Some(chosen));
                }
            }
        }

        Ok(None)
    }

    /// When the event loop should call [`Picker::advance`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.as_ref().and_then(SpinTicker::next_deadline)
    }

    /// Keep only the candidates for which `keep` returns `true`. Called after
    /// every reload so an entry deleted or picked elsewhere mid-spin cannot
    /// win the final draw. A spin left without candidates is abandoned.
    /// Returns whether a pick is still spinning.
    pub fn retain_candidates<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&Entry) -> bool,
    {
        if !self.is_spinning() {
            return false;
        }

        let before = self.candidates.len();
        self.candidates.retain(|entry| keep(entry));
        if self.candidates.len() != before {
            debug!(
                dropped = before - self.candidates.len(),
                remaining = self.candidates.len(),
                "candidates changed mid-spin"
            );
        }

        if self.candidates.is_empty() {
            debug!("no candidates left, abandoning pick");
            self.reset();
            return false;
        }

        let shown_is_gone = self.display.as_ref().is_some_and(|shown| {
            !self.candidates.iter().any(|entry| entry.id == shown.id)
        });
        if shown_is_gone {
            self.display = None;
        }
        true
    }

    /// Abandon a pick in progress without committing anything.
    pub fn cancel(&mut self) {
        if self.is_spinning() {
            self.reset();
        }
    }

    fn reset(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.cancel();
        }
        self.ticker = None;
        self.phase = PickerPhase::Idle;
        self.candidates.clear();
        self.display = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use rand::SeedableRng;

    use super::*;
    use crate::models::{Category, EntryDraft};

    /// In-memory store that records every `set_used` call.
    #[derive(Default)]
    struct RecordingStore {
        entries: RefCell<Vec<Entry>>,
        calls: RefCell<Vec<(String, bool)>>,
        fail_writes: bool,
    }

    impl RecordingStore {
        fn with_labels(labels: &[&str]) -> Self {
            let store = Self::default();
            for label in labels {
                store
                    .entries
                    .borrow_mut()
                    .push(Entry::from_draft(label.to_lowercase(), &EntryDraft::new(*label, "1")));
            }
            store
        }
    }

    impl EntryStore for RecordingStore {
        fn list_entries(&self) -> Vec<Entry> {
            self.entries.borrow().clone()
        }

        fn list_categories(&self) -> Vec<Category> {
            Vec::new()
        }

        fn add_entry(&self, draft: &EntryDraft) -> Result<Entry, StoreError> {
            let entry = Entry::from_draft(draft.label.to_lowercase(), draft);
            self.entries.borrow_mut().push(entry.clone());
            Ok(entry)
        }

        fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
            self.entries.borrow_mut().retain(|entry| entry.id != id);
            Ok(())
        }

        fn set_used(&self, id: &str, used: bool) -> Result<(), StoreError> {
            self.calls.borrow_mut().push((id.to_string(), used));
            if self.fail_writes {
                return Err(StoreError::entry_not_found(id));
            }
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| StoreError::entry_not_found(id))?;
            entry.used_at = used.then(chrono::Utc::now);
            Ok(())
        }

        fn add_category(&self, _category: &Category) -> Result<(), StoreError> {
            Ok(())
        }

        fn delete_category(&self, _id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Replays fixed unit samples, cycling when exhausted.
    struct ScriptedRandom {
        values: Vec<f64>,
        next: usize,
    }

    impl ScriptedRandom {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_unit(&mut self) -> f64 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }

    fn full_spin() -> Duration {
        SPIN_INTERVAL * SPIN_STEPS + SETTLE_DELAY
    }

    #[test]
    fn ticker_emits_fixed_steps_then_settles() {
        let start = Instant::now();
        let mut ticker = SpinTicker::start(start, SpinTiming::default());

        assert_eq!(ticker.poll(start), None);
        assert_eq!(ticker.next_deadline(), Some(start + SPIN_INTERVAL));

        let mut events = Vec::new();
        for step in 1..=SPIN_STEPS {
            let at = start + SPIN_INTERVAL * step;
            events.extend(std::iter::from_fn(|| ticker.poll(at)));
        }
        assert_eq!(events.len(), SPIN_STEPS as usize);
        assert_eq!(events.last(), Some(&TickEvent::Step(SPIN_STEPS)));

        let last_step = start + SPIN_INTERVAL * SPIN_STEPS;
        assert_eq!(ticker.poll(last_step + SETTLE_DELAY / 2), None);
        assert_eq!(ticker.poll(last_step + SETTLE_DELAY), Some(TickEvent::Settle));
        assert_eq!(ticker.next_deadline(), None);
        assert_eq!(ticker.poll(last_step + SETTLE_DELAY * 10), None);
    }

    #[test]
    fn late_poll_catches_up_on_every_event() {
        let start = Instant::now();
        let mut ticker = SpinTicker::start(start, SpinTiming::default());

        let events: Vec<TickEvent> =
            std::iter::from_fn(|| ticker.poll(start + Duration::from_secs(5))).collect();
        assert_eq!(events.len(), SPIN_STEPS as usize + 1);
        assert_eq!(events.last(), Some(&TickEvent::Settle));
    }

    #[test]
    fn cancelled_ticker_stays_silent() {
        let start = Instant::now();
        let mut ticker = SpinTicker::start(start, SpinTiming::default());
        ticker.cancel();
        assert_eq!(ticker.poll(start + full_spin()), None);
        assert_eq!(ticker.next_deadline(), None);
    }

    #[test]
    fn uniform_index_covers_the_whole_range() {
        assert_eq!(uniform_index(4, 0.0), 0);
        assert_eq!(uniform_index(4, 0.2499), 0);
        assert_eq!(uniform_index(4, 0.25), 1);
        assert_eq!(uniform_index(4, 0.999_999), 3);
        assert_eq!(uniform_index(1, 0.7), 0);
    }

    #[test]
    fn available_candidates_skip_used_and_filtered_entries() {
        let mut used = Entry::from_draft("u", &EntryDraft::new("Used", "1"));
        used.used_at = Some(chrono::Utc::now());
        let love = Entry::from_draft("a", &EntryDraft::new("Amore", "1"));
        let hope = Entry::from_draft("h", &EntryDraft::new("Speranza", "9"));
        let entries = vec![used, love.clone(), hope.clone()];

        assert_eq!(
            available_candidates(&entries, &CategoryFilter::All),
            vec![love.clone(), hope]
        );
        assert_eq!(
            available_candidates(&entries, &CategoryFilter::Only("1".into())),
            vec![love]
        );
    }

    #[test]
    fn start_is_a_no_op_without_candidates() {
        let mut picker = Picker::new();
        assert!(!picker.start(Vec::new(), Instant::now()));
        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert_eq!(picker.next_deadline(), None);
    }

    #[test]
    fn start_ignores_used_entries() {
        let mut used = Entry::from_draft("u", &EntryDraft::new("Used", "1"));
        used.used_at = Some(chrono::Utc::now());
        let mut picker = Picker::new();
        assert!(!picker.start(vec![used], Instant::now()));
    }

    #[test]
    fn pick_commits_final_draw_exactly_once() {
        let store = RecordingStore::with_labels(&["Amore", "Passion", "Desire"]);
        let mut picker = Picker::new();
        let start = Instant::now();
        // 20 animation draws land on index 0, the final draw on index 2.
        let mut script = vec![0.1; SPIN_STEPS as usize];
        script.push(0.9);
        let mut rng = ScriptedRandom::new(&script);

        assert!(picker.start(store.list_entries(), start));
        assert!(!picker.start(store.list_entries(), start), "second pick refused");

        let halfway = start + SPIN_INTERVAL * (SPIN_STEPS / 2);
        assert_eq!(picker.advance(halfway, &mut rng, &store).expect("advance"), None);
        assert_eq!(picker.phase(), PickerPhase::Spinning);
        assert_eq!(picker.display().map(|e| e.id.as_str()), Some("amore"));
        assert!(store.calls.borrow().is_empty());

        let picked = picker
            .advance(start + full_spin(), &mut rng, &store)
            .expect("advance")
            .expect("settled");
        assert_eq!(picked.id, "desire");
        assert_eq!(picker.phase(), PickerPhase::Settled);
        assert_eq!(picker.result(), Some(&picked));
        assert_eq!(*store.calls.borrow(), vec![("desire".to_string(), true)]);

        assert_eq!(
            picker
                .advance(start + full_spin() * 2, &mut rng, &store)
                .expect("advance"),
            None
        );
        assert_eq!(store.calls.borrow().len(), 1);
    }

    #[test]
    fn store_failure_leaves_picker_settled() {
        let mut store = RecordingStore::with_labels(&["Amore"]);
        store.fail_writes = true;
        let mut picker = Picker::new();
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(7);

        picker.start(store.list_entries(), start);
        let result = picker.advance(start + full_spin(), &mut rng, &store);

        assert!(result.is_err());
        assert_eq!(picker.phase(), PickerPhase::Settled);
        assert_eq!(picker.result().map(|e| e.id.as_str()), Some("amore"));
        assert!(!store.list_entries()[0].is_used());
    }

    #[test]
    fn changing_filter_abandons_the_spin() {
        let store = RecordingStore::with_labels(&["Amore"]);
        let mut picker = Picker::new();
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(1);

        picker.start(store.list_entries(), start);
        picker.set_filter(CategoryFilter::Only("2".into()));

        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert_eq!(picker.display(), None);
        assert_eq!(
            picker
                .advance(start + full_spin(), &mut rng, &store)
                .expect("advance"),
            None
        );
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn repeated_picks_never_reuse_an_entry() {
        let store = RecordingStore::with_labels(&["Amore", "Passion", "Desire", "Luce"]);
        let mut picker = Picker::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = Vec::new();
        let mut now = Instant::now();

        loop {
            let candidates = available_candidates(&store.list_entries(), &CategoryFilter::All);
            if !picker.start(candidates, now) {
                break;
            }
            now += full_spin();
            let picked = picker
                .advance(now, &mut rng, &store)
                .expect("advance")
                .expect("settled");
            assert!(!seen.contains(&picked.id));
            seen.push(picked.id);
        }

        assert_eq!(seen.len(), 4);
        assert!(store.list_entries().iter().all(Entry::is_used));
    }

    #[test]
    fn restore_makes_entry_eligible_again() {
        let store = RecordingStore::with_labels(&["Amore"]);
        store.set_used("amore", true).expect("mark used");
        assert!(available_candidates(&store.list_entries(), &CategoryFilter::All).is_empty());

        restore(&store, "amore").expect("restore");
        let candidates = available_candidates(&store.list_entries(), &CategoryFilter::All);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "amore");
    }

    #[test]
    fn entries_dropped_mid_spin_cannot_win() {
        let store = RecordingStore::with_labels(&["Amore", "Passion"]);
        let mut picker = Picker::new();
        let start = Instant::now();
        assert!(picker.start(store.list_entries(), start));

        // Frames land on "amore" before it disappears.
        let mut rng = ScriptedRandom::new(&[0.0]);
        picker
            .advance(start + SPIN_INTERVAL, &mut rng, &store)
            .expect("advance");
        assert_eq!(picker.display().map(|e| e.id.as_str()), Some("amore"));

        store.delete_entry("amore").expect("delete");
        let live = store.list_entries();
        assert!(picker.retain_candidates(|entry| live.iter().any(|e| e.id == entry.id)));
        assert_eq!(picker.display(), None);

        let picked = picker
            .advance(start + full_spin(), &mut rng, &store)
            .expect("advance")
            .expect("settled");
        assert_eq!(picked.id, "passion");
        assert_eq!(*store.calls.borrow(), vec![("passion".to_string(), true)]);
    }

    #[test]
    fn losing_every_candidate_abandons_the_spin() {
        let store = RecordingStore::with_labels(&["Amore"]);
        let mut picker = Picker::new();
        let start = Instant::now();
        picker.start(store.list_entries(), start);

        assert!(!picker.retain_candidates(|_| false));
        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert_eq!(picker.next_deadline(), None);

        let mut rng = StdRng::seed_from_u64(3);
        let settled = picker
            .advance(start + full_spin(), &mut rng, &store)
            .expect("advance");
        assert!(settled.is_none());
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn retain_is_ignored_once_settled() {
        let store = RecordingStore::with_labels(&["Amore"]);
        let mut picker = Picker::new();
        let start = Instant::now();
        picker.start(store.list_entries(), start);
        let mut rng = StdRng::seed_from_u64(3);
        picker
            .advance(start + full_spin(), &mut rng, &store)
            .expect("advance");

        assert!(!picker.retain_candidates(|_| false));
        assert_eq!(picker.phase(), PickerPhase::Settled);
        assert_eq!(picker.result().map(|e| e.id.as_str()), Some("amore"));
    }

    #[test]
    fn final_draw_is_uniform_over_candidates() {
        const CANDIDATES: usize = 5;
        const TRIALS: usize = 20_000;

        let labels = ["Amore", "Passion", "Desire", "Luce", "Sogno"];
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..TRIALS {
            let store = RecordingStore::with_labels(&labels);
            let mut picker = Picker::new();
            let start = Instant::now();
            picker.start(store.list_entries(), start);
            let picked = picker
                .advance(start + full_spin(), &mut rng, &store)
                .expect("advance")
                .expect("settled");
            *counts.entry(picked.id).or_default() += 1;
        }

        assert_eq!(counts.len(), CANDIDATES);
        let expected = TRIALS as f64 / CANDIDATES as f64;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 4 degrees of freedom, p = 0.001.
        assert!(chi_square < 18.47, "chi-square {chi_square} too large: {counts:?}");
    }
}
