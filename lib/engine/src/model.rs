use crate::notify::{Listeners, SubscriptionId};
use crate::worker::{BackgroundJob, BackgroundWorker};
use parking_lot::{Condvar, Mutex, RwLock};
use siftx_core::config::cutoff_eq;
use siftx_core::{
    rank, same_records, Error, Generation, GenerationCounter, RankedView, Record, Result,
    ScoreMap, SearchConfig,
};
use siftx_similarity::{compute_scores, Scorer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Counters describing what the scheduler has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Scoring passes requested.
    pub dispatched: u64,
    /// Passes whose scores were installed.
    pub installed: u64,
    /// Passes that finished after a newer request and were thrown away.
    pub discarded: u64,
    /// Passes never started because a newer request was already pending.
    pub skipped: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    installed: AtomicU64,
    discarded: AtomicU64,
    skipped: AtomicU64,
}

struct State<R: ?Sized> {
    config: SearchConfig,
    items: Arc<[Arc<R>]>,
    scores: Arc<ScoreMap<R>>,
    /// Newest generation whose view has been installed and delivered.
    settled: Generation,
}

/// State shared between the owning model and its in-flight jobs.
struct Shared<R: ?Sized> {
    generations: GenerationCounter,
    state: Mutex<State<R>>,
    settled_changed: Condvar,
    view: RwLock<Arc<RankedView<R>>>,
    listeners: Listeners<R>,
    counters: Counters,
}

impl<R: Record + ?Sized> Shared<R> {
    /// Install `scores` if no newer request has been made since they were
    /// dispatched, and re-rank. Returns the view built from them.
    fn install(&self, scores: ScoreMap<R>) -> Option<Arc<RankedView<R>>> {
        let mut state = self.state.lock();
        let generation = scores.generation();

        if !self.generations.is_current(generation) {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            trace!(%generation, current = %self.generations.current(), "discarding stale scores");
            return None;
        }

        state.scores = Arc::new(scores);
        let view = self.refresh_view(&state);
        self.counters.installed.fetch_add(1, Ordering::Relaxed);
        debug!(%generation, visible = view.len(), "installed scores");
        Some(view)
    }

    fn mark_settled(&self, generation: Generation) {
        let mut state = self.state.lock();
        if generation > state.settled {
            state.settled = generation;
        }
        self.settled_changed.notify_all();
    }

    fn refresh_view(&self, state: &State<R>) -> Arc<RankedView<R>> {
        let view = Arc::new(rank(&state.items, &state.scores, &state.config));
        *self.view.write() = view.clone();
        view
    }
}

struct ScoringJob<R: ?Sized> {
    generation: Generation,
    scorer: Scorer,
    snapshot: Arc<[Arc<R>]>,
    shared: Arc<Shared<R>>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl<R: Record + ?Sized> BackgroundJob for ScoringJob<R> {
    fn execute(self: Box<Self>) {
        let ScoringJob {
            generation,
            scorer,
            snapshot,
            shared,
            pool,
        } = *self;

        if shared.generations.is_current(generation) {
            let scores = match &pool {
                Some(pool) => pool.install(|| compute_scores(&scorer, generation, snapshot)),
                None => compute_scores(&scorer, generation, snapshot),
            };
            // A superseded pass stays silent; the current one reports any
            // item change made since the last delivery.
            if let Some(view) = shared.install(scores) {
                shared.listeners.deliver(view);
                shared.mark_settled(generation);
            }
        } else {
            shared.counters.skipped.fetch_add(1, Ordering::Relaxed);
            trace!(%generation, "skipping superseded scoring pass");
        }
    }
}

/// Builder for [`SearchModel`].
pub struct SearchModelBuilder<R: ?Sized> {
    config: SearchConfig,
    items: Vec<Arc<R>>,
    threads: Option<usize>,
}

impl<R: Record + ?Sized> SearchModelBuilder<R> {
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn items(mut self, items: Vec<Arc<R>>) -> Self {
        self.items = items;
        self
    }

    /// Score on a dedicated rayon pool of `threads` workers instead of the
    /// global pool.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn build(self) -> Result<SearchModel<R>> {
        let pool = match self.threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("siftx-score-{}", i))
                    .build()
                    .map_err(|e| Error::Worker(e.to_string()))?,
            )),
            None => None,
        };

        let mut config = self.config;
        config.cutoff = clamp_cutoff(config.cutoff).unwrap_or(0.0);

        let initial = Arc::new(RankedView::empty());
        let shared = Arc::new(Shared {
            generations: GenerationCounter::new(),
            state: Mutex::new(State {
                config,
                items: Arc::from(self.items),
                scores: Arc::new(ScoreMap::empty()),
                settled: Generation::ZERO,
            }),
            settled_changed: Condvar::new(),
            view: RwLock::new(initial.clone()),
            listeners: Listeners::new(initial),
            counters: Counters::default(),
        });

        let model = SearchModel {
            shared,
            worker: BackgroundWorker::spawn("siftx-scheduler")?,
            pool,
        };

        {
            let state = model.shared.state.lock();
            model.shared.refresh_view(&state);
            model.dispatch(&state);
        }
        Ok(model)
    }
}

/// Incrementally ranked view over a set of records.
///
/// Mutators return immediately. Each one that changes something schedules a
/// scoring pass on a background thread; when the newest pass finishes its
/// scores are installed, the view is re-ranked and subscribers hear about
/// it if the visible order changed. Results of superseded passes are
/// dropped.
pub struct SearchModel<R: Record + ?Sized> {
    shared: Arc<Shared<R>>,
    worker: BackgroundWorker,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl<R: Record + ?Sized> SearchModel<R> {
    /// A model with the default configuration and no records.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> SearchModelBuilder<R> {
        SearchModelBuilder {
            config: SearchConfig::default(),
            items: Vec::new(),
            threads: None,
        }
    }

    // Mutators

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|config| replace(&mut config.query, query));
    }

    pub fn set_keys(&self, keys: Vec<String>) {
        self.update(|config| replace(&mut config.keys, keys));
    }

    pub fn set_weights(&self, weights: Vec<f64>) {
        self.update(|config| replace(&mut config.weights, weights));
    }

    pub fn set_concat(&self, concat: bool) {
        self.update(|config| replace(&mut config.concat, concat));
    }

    /// Values outside [0, 1] are clamped; NaN is ignored.
    pub fn set_cutoff(&self, cutoff: f64) {
        let Some(cutoff) = clamp_cutoff(cutoff) else {
            return;
        };
        self.update(|config| {
            if cutoff_eq(config.cutoff, cutoff) {
                return false;
            }
            config.cutoff = cutoff;
            true
        });
    }

    pub fn set_case_sensitive(&self, case_sensitive: bool) {
        self.update(|config| replace(&mut config.case_sensitive, case_sensitive));
    }

    /// Replace the whole configuration with a single recompute.
    pub fn set_config(&self, mut config: SearchConfig) {
        config.cutoff = clamp_cutoff(config.cutoff).unwrap_or(0.0);
        self.update(|current| replace(current, config));
    }

    /// Replace the item set. Identical sequences are a no-op.
    pub fn set_items(&self, items: Vec<Arc<R>>) {
        self.update_items(|current| {
            if same_records(current, &items) {
                None
            } else {
                Some(items)
            }
        });
    }

    pub fn push_item(&self, item: Arc<R>) {
        self.update_items(|current| {
            let mut items = current.to_vec();
            items.push(item);
            Some(items)
        });
    }

    /// Remove `item` from the item set. Returns whether it was present.
    pub fn remove_item(&self, item: &Arc<R>) -> bool {
        let mut removed = false;
        self.update_items(|current| {
            let index = current.iter().position(|other| Arc::ptr_eq(other, item))?;
            let mut items = current.to_vec();
            items.remove(index);
            removed = true;
            Some(items)
        });
        removed
    }

    pub fn clear_items(&self) {
        self.set_items(Vec::new());
    }

    // Readers

    /// The current ranked view.
    pub fn ranked_items(&self) -> Arc<RankedView<R>> {
        self.shared.view.read().clone()
    }

    pub fn items(&self) -> Arc<[Arc<R>]> {
        self.shared.state.lock().items.clone()
    }

    pub fn config(&self) -> SearchConfig {
        self.shared.state.lock().config.clone()
    }

    pub fn query(&self) -> String {
        self.shared.state.lock().config.query.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.shared.state.lock().config.keys.clone()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.shared.state.lock().config.weights.clone()
    }

    pub fn concat(&self) -> bool {
        self.shared.state.lock().config.concat
    }

    pub fn cutoff(&self) -> f64 {
        self.shared.state.lock().config.cutoff
    }

    pub fn case_sensitive(&self) -> bool {
        self.shared.state.lock().config.case_sensitive
    }

    /// Installed score of `item`, if the installed scores cover it.
    pub fn score_of(&self, item: &Arc<R>) -> Option<f64> {
        self.shared.state.lock().scores.score_of(item)
    }

    /// Tag of the newest scoring request.
    pub fn generation(&self) -> Generation {
        self.shared.generations.current()
    }

    /// Tag of the scores currently installed.
    pub fn installed_generation(&self) -> Generation {
        self.shared.state.lock().scores.generation()
    }

    pub fn stats(&self) -> SchedulerStats {
        let counters = &self.shared.counters;
        SchedulerStats {
            dispatched: counters.dispatched.load(Ordering::Relaxed),
            installed: counters.installed.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Scoring passes queued but not yet started.
    pub fn pending_jobs(&self) -> usize {
        self.worker.pending_jobs()
    }

    /// Block until the newest request has been installed and its view
    /// delivered to subscribers, or `timeout` elapses. Returns whether the
    /// model caught up.
    ///
    /// Must not be called from a ranking-changed callback: those run on the
    /// thread that does the installing.
    pub fn wait_until_current(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if state.settled == self.shared.generations.current() {
                return true;
            }
            if self
                .shared
                .settled_changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.settled == self.shared.generations.current();
            }
        }
    }

    // Notification

    /// Call `callback` with the new view whenever the visible order changes.
    ///
    /// Callbacks run on the scheduler thread, one at a time and in order.
    pub fn on_ranking_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Arc<RankedView<R>>) + Send + Sync + 'static,
    {
        self.shared.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.listeners.unsubscribe(id)
    }

    fn update(&self, apply: impl FnOnce(&mut SearchConfig) -> bool) {
        let mut state = self.shared.state.lock();
        if apply(&mut state.config) {
            self.dispatch(&state);
        }
    }

    fn update_items(&self, apply: impl FnOnce(&[Arc<R>]) -> Option<Vec<Arc<R>>>) {
        let mut state = self.shared.state.lock();
        let Some(items) = apply(&state.items) else {
            return;
        };
        state.items = Arc::from(items);
        // Structural changes show up right away, ranked with the installed
        // scores; fresh scores follow.
        self.shared.refresh_view(&state);
        self.dispatch(&state);
    }

    /// Supersede everything in flight and queue a pass over the current
    /// items. Called with the state lock held so installation cannot
    /// interleave with the generation bump.
    fn dispatch(&self, state: &State<R>) {
        let generation = self.shared.generations.advance();
        self.shared.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!(%generation, items = state.items.len(), query = %state.config.query, "dispatching scoring pass");

        self.worker.submit(Box::new(ScoringJob {
            generation,
            scorer: Scorer::from_config(&state.config),
            snapshot: state.items.clone(),
            shared: self.shared.clone(),
            pool: self.pool.clone(),
        }));
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn clamp_cutoff(cutoff: f64) -> Option<f64> {
    if cutoff.is_nan() {
        None
    } else {
        Some(cutoff.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn apps() -> Vec<Arc<Value>> {
        ["Firefox", "Files", "Terminal"]
            .iter()
            .map(|name| Arc::new(json!({ "name": name })))
            .collect()
    }

    fn names(view: &RankedView<Value>) -> Vec<String> {
        view.iter().map(|r| r.get_field("name").into_owned()).collect()
    }

    fn settled(model: &SearchModel<Value>) -> Vec<String> {
        assert!(model.wait_until_current(TIMEOUT));
        names(&model.ranked_items())
    }

    #[test]
    fn test_defaults() {
        let model: SearchModel<Value> = SearchModel::new().unwrap();
        assert_eq!(model.keys(), vec!["name".to_string()]);
        assert_eq!(model.cutoff(), 0.3);
        assert!(!model.concat());
        assert!(!model.case_sensitive());
        assert!(model.query().is_empty());
        assert!(model.wait_until_current(TIMEOUT));
        assert!(model.ranked_items().is_empty());
    }

    #[test]
    fn test_query_filters_and_orders() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        assert_eq!(settled(&model), vec!["Terminal", "Firefox", "Files"]);

        model.set_query("fire");
        assert_eq!(settled(&model), vec!["Firefox", "Files"]);

        model.set_cutoff(0.7);
        assert_eq!(settled(&model), vec!["Firefox"]);

        model.set_query("");
        assert_eq!(settled(&model), vec!["Terminal", "Firefox", "Files"]);
    }

    #[test]
    fn test_noop_setters_do_not_dispatch() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        assert!(model.wait_until_current(TIMEOUT));
        let before = model.generation();

        model.set_query("");
        model.set_keys(vec!["name".to_string()]);
        model.set_weights(Vec::new());
        model.set_concat(false);
        model.set_cutoff(0.1 + 0.2);
        model.set_cutoff(f64::NAN);
        model.set_case_sensitive(false);
        model.set_items(model.items().to_vec());

        assert_eq!(model.generation(), before);
        assert_eq!(model.stats().dispatched, 1);
    }

    #[test]
    fn test_cutoff_is_clamped() {
        let model: SearchModel<Value> = SearchModel::new().unwrap();
        model.set_cutoff(4.0);
        assert_eq!(model.cutoff(), 1.0);
        model.set_cutoff(-1.0);
        assert_eq!(model.cutoff(), 0.0);
    }

    #[test]
    fn test_item_changes_rerank() {
        let items = apps();
        let model = SearchModel::builder().items(items.clone()).build().unwrap();
        model.set_query("fire");
        assert_eq!(settled(&model), vec!["Firefox", "Files"]);

        assert!(model.remove_item(&items[0]));
        // Visible before the new scores land.
        assert_eq!(names(&model.ranked_items()), vec!["Files"]);
        assert!(!model.remove_item(&items[0]));

        model.push_item(Arc::new(json!({"name": "Fire"})));
        assert_eq!(settled(&model), vec!["Fire", "Files"]);

        model.clear_items();
        assert!(model.ranked_items().is_empty());
        assert!(model.wait_until_current(TIMEOUT));
        assert!(model.items().is_empty());
    }

    #[test]
    fn test_notifies_on_change_only() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        assert!(model.wait_until_current(TIMEOUT));

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        model.on_ranking_changed(move |view| {
            let _ = tx.lock().send(names(&view));
        });

        model.set_query("fire");
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), vec!["Firefox", "Files"]);

        // Same visible order with a different query: no event.
        model.set_query("fir");
        assert!(model.wait_until_current(TIMEOUT));
        model.set_query("term");
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), vec!["Terminal"]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribed_callback_is_silent() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        assert!(model.wait_until_current(TIMEOUT));

        let (tx, rx) = mpsc::channel::<()>();
        let tx = Mutex::new(tx);
        let id = model.on_ranking_changed(move |_| {
            let _ = tx.lock().send(());
        });
        assert!(model.unsubscribe(id));

        model.set_query("fire");
        assert!(model.wait_until_current(TIMEOUT));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_panicking_subscriber_still_settles() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        assert!(model.wait_until_current(TIMEOUT));
        model.on_ranking_changed(|_| panic!("subscriber failure"));

        model.set_query("term");
        assert!(model.wait_until_current(TIMEOUT));
        assert_eq!(names(&model.ranked_items()), vec!["Terminal"]);

        model.set_query("fire");
        assert_eq!(settled(&model), vec!["Firefox", "Files"]);
    }

    #[test]
    fn test_dedicated_pool() {
        let model = SearchModel::builder()
            .items(apps())
            .threads(2)
            .config(SearchConfig {
                query: "term".into(),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(settled(&model), vec!["Terminal"]);
        assert!(model.score_of(&model.items()[2]).is_some_and(|s| s > 0.6));
    }

    #[test]
    fn test_set_config_single_dispatch() {
        let model = SearchModel::builder().items(apps()).build().unwrap();
        model.set_config(SearchConfig {
            query: "files".into(),
            cutoff: 0.6,
            ..Default::default()
        });
        assert_eq!(model.stats().dispatched, 2);
        assert_eq!(settled(&model), vec!["Files"]);
    }
}
