//! Search session controller.
//!
//! One session runs `Idle -> Validating -> InFlight -> {Success, Empty,
//! Failed} -> Idle`. Re-enabling the trigger is tied to a drop guard, so it
//! happens exactly once however the in-flight phase ends, including when the
//! session future itself is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lithocore_core::Category;
use lithocore_mindat::{partition_placeable, LocalityFilters, MindatError, RawLocality};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::classifier::{
    classify, explanation_for, ClassifiedLocality, LexiconClassifier, LocalityClassifier,
};
use crate::error::{SessionBusy, SessionFailure};
use crate::registry::{LayerRegistry, LayerSnapshot, Marker, MarkerOrigin};
use crate::source::LocalitySource;
use crate::surface::{Notice, RenderSurface};
use crate::viewport::{Bounds, DEFAULT_PADDING};
use crate::warm::{self, WarmLoadReport};

pub const DEFAULT_SESSION_DEADLINE: Duration = Duration::from_secs(30);

const EMPTY_QUERY_NOTICE: &str = "Please enter a mineral name.";
const INVALID_MINERAL_NOTICE: &str = "Please choose a mineral from the list.";
const MISSING_CREDENTIAL_NOTICE: &str =
    "Mineral data is unavailable because the data provider is not configured.";
const FAILED_NOTICE: &str = "Localities could not be loaded. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Validating,
    InFlight,
    Success,
    Empty,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Success | SessionStatus::Empty | SessionStatus::Failed
        )
    }
}

/// Which buckets a search by name fills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Mineral description plus localities, classified into `official` and
    /// `unofficial`.
    #[default]
    Classified,
    /// Localities only, all placed in `searchResult`.
    ResultsOnly,
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classified" => Ok(SearchMode::Classified),
            "results" | "resultsonly" | "results-only" => Ok(SearchMode::ResultsOnly),
            other => Err(format!("unknown search mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub filters: LocalityFilters,
    /// Upper bound on the in-flight phase; expiry ends the session `Failed`.
    pub deadline: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            filters: LocalityFilters::default(),
            deadline: DEFAULT_SESSION_DEADLINE,
        }
    }
}

/// Outcome of one session.
///
/// `status` is the terminal state reached, or `Idle` when validation
/// aborted the session before any request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub query: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub placed: usize,
    pub unplaceable: usize,
    pub bounds: Option<Bounds>,
    pub notice: Option<Notice>,
    pub mineral_description: Option<String>,
    /// Diagnostic detail for `Failed` sessions. Never serialized.
    #[serde(skip)]
    pub failure: Option<SessionFailure>,
}

impl SessionReport {
    fn new(query: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            query: query.to_string(),
            status: SessionStatus::Idle,
            started_at,
            finished_at: started_at,
            placed: 0,
            unplaceable: 0,
            bounds: None,
            notice: None,
            mineral_description: None,
            failure: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    ByName { query: &'a str, mode: SearchMode },
    ById { mineral_id: i64, name: &'a str },
}

impl Lookup<'_> {
    fn label(&self) -> &str {
        match self {
            Lookup::ByName { query, .. } => *query,
            Lookup::ById { name, .. } => *name,
        }
    }

    /// Buckets cleared before the request and filled afterwards.
    fn categories(&self) -> &'static [Category] {
        match self {
            Lookup::ByName {
                mode: SearchMode::Classified,
                ..
            } => &[Category::SearchResult, Category::Official, Category::Unofficial],
            Lookup::ByName {
                mode: SearchMode::ResultsOnly,
                ..
            }
            | Lookup::ById { .. } => &[Category::SearchResult],
        }
    }

    fn classifies(&self) -> bool {
        matches!(
            self,
            Lookup::ByName {
                mode: SearchMode::Classified,
                ..
            }
        )
    }

    fn rejection(&self) -> Option<&'static str> {
        match self {
            Lookup::ByName { query, .. } if query.trim().is_empty() => Some(EMPTY_QUERY_NOTICE),
            Lookup::ById { mineral_id, .. } if *mineral_id <= 0 => Some(INVALID_MINERAL_NOTICE),
            _ => None,
        }
    }
}

/// Resets the session to `Idle` and re-enables the trigger when dropped.
struct TriggerGuard<'a, R: RenderSurface + ?Sized> {
    surface: &'a mut R,
    status: &'a mut SessionStatus,
}

impl<'a, R: RenderSurface + ?Sized> TriggerGuard<'a, R> {
    fn engage(surface: &'a mut R, status: &'a mut SessionStatus) -> Self {
        *status = SessionStatus::InFlight;
        surface.set_trigger_enabled(false);
        Self { surface, status }
    }
}

impl<R: RenderSurface + ?Sized> Drop for TriggerGuard<'_, R> {
    fn drop(&mut self) {
        *self.status = SessionStatus::Idle;
        self.surface.set_trigger_enabled(true);
    }
}

struct Fetched {
    localities: Vec<RawLocality>,
    description: Option<String>,
}

async fn fetch<S: LocalitySource>(
    source: &S,
    lookup: Lookup<'_>,
    filters: &LocalityFilters,
) -> Result<Fetched, MindatError> {
    match lookup {
        Lookup::ByName {
            query,
            mode: SearchMode::Classified,
        } => {
            let (localities, description) = tokio::join!(
                source.localities_by_mineral(query, filters),
                source.mineral_description(query),
            );
            Ok(Fetched {
                localities: localities?,
                description: description?,
            })
        }
        Lookup::ByName {
            query,
            mode: SearchMode::ResultsOnly,
        } => Ok(Fetched {
            localities: source.localities_by_mineral(query, filters).await?,
            description: None,
        }),
        Lookup::ById { mineral_id, .. } => Ok(Fetched {
            localities: source.localities_by_id(mineral_id).await?,
            description: None,
        }),
    }
}

/// Classifies and places one fetched batch. Returns `(placed, unplaceable)`.
fn populate<C: LocalityClassifier + ?Sized>(
    registry: &mut LayerRegistry,
    classifier: &C,
    lookup: Lookup<'_>,
    localities: &[RawLocality],
) -> (usize, usize) {
    let parts = partition_placeable(localities);
    let mineral = lookup.label();
    let mut placed = 0;

    for locality in parts.placeable {
        let classified = if lookup.classifies() {
            classify(locality, classifier)
        } else {
            ClassifiedLocality {
                locality,
                category: Category::SearchResult,
                explanation: explanation_for(Category::SearchResult),
            }
        };
        if let Some(marker) = Marker::from_classified(&classified, Some(mineral)) {
            registry.add_marker(classified.category, marker);
            placed += 1;
        }
    }

    (placed, parts.unplaceable)
}

/// Input and credential checks. `Some` aborts the session before any
/// request is made.
fn rejection<S: LocalitySource>(lookup: Lookup<'_>, source: &S) -> Option<Notice> {
    if let Some(message) = lookup.rejection() {
        Some(Notice::warning(message))
    } else if source.has_credential() {
        None
    } else {
        tracing::warn!("search rejected: MINDAT_API_KEY is not configured");
        Some(Notice::error(MISSING_CREDENTIAL_NOTICE))
    }
}

fn rejected<R: RenderSurface + ?Sized>(
    mut report: SessionReport,
    notice: Notice,
    surface: &mut R,
) -> SessionReport {
    surface.notify(notice.clone());
    report.notice = Some(notice);
    report.finished_at = Utc::now();
    report
}

/// Drops the previous search's markers. Authored and warm-loaded markers in
/// the same buckets are kept.
fn clear_previous(registry: &mut LayerRegistry, lookup: Lookup<'_>) {
    for category in lookup.categories() {
        registry.clear_search_results(*category);
    }
}

async fn fetch_bounded<S: LocalitySource>(
    source: &S,
    lookup: Lookup<'_>,
    options: &SearchOptions,
) -> Result<Fetched, SessionFailure> {
    match tokio::time::timeout(options.deadline, fetch(source, lookup, &options.filters)).await {
        Ok(Ok(fetched)) => Ok(fetched),
        Ok(Err(e)) => Err(SessionFailure::Provider(e)),
        Err(_) => Err(SessionFailure::DeadlineExceeded(options.deadline)),
    }
}

/// Places a successful fetch, fits the viewport to this session's markers
/// and picks the terminal state.
fn conclude<C, R>(
    registry: &mut LayerRegistry,
    classifier: &C,
    lookup: Lookup<'_>,
    fetched: Result<Fetched, SessionFailure>,
    report: &mut SessionReport,
    surface: &mut R,
) -> (SessionStatus, Notice)
where
    C: LocalityClassifier + ?Sized,
    R: RenderSurface + ?Sized,
{
    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(failure) => {
            tracing::warn!(query = lookup.label(), error = %failure, "search session failed");
            report.failure = Some(failure);
            return (SessionStatus::Failed, Notice::error(FAILED_NOTICE));
        }
    };

    let categories = lookup.categories();
    let (placed, unplaceable) = populate(registry, classifier, lookup, &fetched.localities);
    report.placed = placed;
    report.unplaceable = unplaceable;
    report.mineral_description = fetched.description;

    if placed == 0 {
        let message = if fetched.localities.is_empty() {
            format!("No localities found for '{}'.", lookup.label())
        } else {
            format!(
                "No localities with coordinates found for '{}'.",
                lookup.label()
            )
        };
        return (SessionStatus::Empty, Notice::info(message));
    }

    report.bounds = Bounds::enclosing(registry.points_from(categories, MarkerOrigin::Search))
        .map(|b| b.pad(DEFAULT_PADDING));
    if let Some(bounds) = report.bounds {
        surface.fit_bounds(bounds);
    }
    for category in categories {
        if registry.count_from(*category, MarkerOrigin::Search) > 0 {
            registry.set_visible(*category, true);
            surface.show_layer(*category);
        }
    }
    (
        SessionStatus::Success,
        Notice::info(format!("{placed} localities found for '{}'.", lookup.label())),
    )
}

/// Records the terminal state, then releases the trigger.
fn close<R: RenderSurface + ?Sized>(
    guard: TriggerGuard<'_, R>,
    lookup: Lookup<'_>,
    terminal: SessionStatus,
    notice: Notice,
    mut report: SessionReport,
) -> SessionReport {
    tracing::info!(
        query = lookup.label(),
        status = ?terminal,
        placed = report.placed,
        unplaceable = report.unplaceable,
        "search session finished"
    );
    *guard.status = terminal;
    guard.surface.notify(notice.clone());
    drop(guard);

    report.status = terminal;
    report.notice = Some(notice);
    report.finished_at = Utc::now();
    report
}

/// Drives one search at a time against a [`LocalitySource`].
///
/// `submit` takes `&mut self`, so a single controller can never run two
/// sessions at once. Use [`SharedSearchController`] when several callers
/// share one controller.
#[derive(Debug)]
pub struct SearchController<S, C = LexiconClassifier> {
    source: S,
    classifier: C,
    registry: LayerRegistry,
    options: SearchOptions,
    status: SessionStatus,
}

impl<S: LocalitySource, C: LocalityClassifier> SearchController<S, C> {
    #[must_use]
    pub fn new(source: S, classifier: C, options: SearchOptions) -> Self {
        Self {
            source,
            classifier,
            registry: LayerRegistry::new(),
            options,
            status: SessionStatus::Idle,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    /// Runs one search by mineral name using the configured mode.
    pub async fn submit<R: RenderSurface + ?Sized>(
        &mut self,
        query: &str,
        surface: &mut R,
    ) -> SessionReport {
        let mode = self.options.mode;
        self.submit_with_mode(query, mode, surface).await
    }

    pub async fn submit_with_mode<R: RenderSurface + ?Sized>(
        &mut self,
        query: &str,
        mode: SearchMode,
        surface: &mut R,
    ) -> SessionReport {
        let query = query.trim();
        self.run(Lookup::ByName { query, mode }, surface).await
    }

    /// Loads the localities of a mineral picked from search results into the
    /// `searchResult` bucket.
    pub async fn select_mineral<R: RenderSurface + ?Sized>(
        &mut self,
        mineral_id: i64,
        name: &str,
        surface: &mut R,
    ) -> SessionReport {
        let name = name.trim();
        self.run(Lookup::ById { mineral_id, name }, surface).await
    }

    /// Warm-loads default minerals into the classified buckets.
    pub async fn warm_load(
        &mut self,
        minerals: &[String],
        filters: &LocalityFilters,
    ) -> WarmLoadReport {
        warm::warm_load(
            &self.source,
            &mut self.registry,
            &self.classifier,
            minerals,
            filters,
        )
        .await
    }

    async fn run<R: RenderSurface + ?Sized>(
        &mut self,
        lookup: Lookup<'_>,
        surface: &mut R,
    ) -> SessionReport {
        let mut report = SessionReport::new(lookup.label(), Utc::now());
        self.status = SessionStatus::Validating;

        if let Some(notice) = rejection(lookup, &self.source) {
            self.status = SessionStatus::Idle;
            return rejected(report, notice, surface);
        }

        let Self {
            source,
            classifier,
            registry,
            options,
            status,
        } = self;

        clear_previous(registry, lookup);
        let guard = TriggerGuard::engage(surface, status);
        tracing::info!(query = lookup.label(), "search session in flight");

        let fetched = fetch_bounded(source, lookup, options).await;
        let (terminal, notice) = conclude(
            registry,
            classifier,
            lookup,
            fetched,
            &mut report,
            &mut *guard.surface,
        );
        close(guard, lookup, terminal, notice, report)
    }
}

/// Marks a session of a [`SharedSearchController`] as in flight until
/// dropped.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, SessionBusy> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(Arc::clone(flag)))
            .map_err(|_| SessionBusy)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A [`SearchController`] shared between callers.
///
/// At most one session is in flight: [`try_submit`](Self::try_submit)
/// returns [`SessionBusy`] instead of waiting when another session is
/// running. The in-flight flag is separate from the registry lock, which a
/// session only takes briefly to clear and to place results, so layer reads
/// and toggles never make a search busy and never wait for a request.
pub struct SharedSearchController<S, C = LexiconClassifier> {
    inner: Arc<Mutex<SearchController<S, C>>>,
    source: S,
    options: SearchOptions,
    in_flight: Arc<AtomicBool>,
}

impl<S: Clone, C> Clone for SharedSearchController<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            source: self.source.clone(),
            options: self.options.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S, C> SharedSearchController<S, C>
where
    S: LocalitySource + Clone,
    C: LocalityClassifier,
{
    #[must_use]
    pub fn new(controller: SearchController<S, C>) -> Self {
        let source = controller.source.clone();
        let options = controller.options.clone();
        Self {
            inner: Arc::new(Mutex::new(controller)),
            source,
            options,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.source.has_credential()
    }

    /// Whether a session is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one session unless another is already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionBusy`] when another session is running.
    pub async fn try_submit<R: RenderSurface + ?Sized>(
        &self,
        query: &str,
        mode: SearchMode,
        surface: &mut R,
    ) -> Result<SessionReport, SessionBusy> {
        let query = query.trim();
        self.run(Lookup::ByName { query, mode }, surface).await
    }

    /// Like [`SearchController::select_mineral`], unless a session is in
    /// flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionBusy`] when another session is running.
    pub async fn try_select_mineral<R: RenderSurface + ?Sized>(
        &self,
        mineral_id: i64,
        name: &str,
        surface: &mut R,
    ) -> Result<SessionReport, SessionBusy> {
        let name = name.trim();
        self.run(Lookup::ById { mineral_id, name }, surface).await
    }

    /// Waits for the controller; used for reads and setup, not for sessions.
    pub async fn lock(&self) -> MutexGuard<'_, SearchController<S, C>> {
        self.inner.lock().await
    }

    pub async fn snapshot(&self) -> Vec<LayerSnapshot> {
        self.lock().await.registry().snapshot()
    }

    pub async fn set_layer_visible(&self, category: Category, visible: bool) {
        self.lock().await.registry_mut().set_visible(category, visible);
    }

    /// Warm-loads default minerals. Requests run without holding the
    /// controller; it is locked only to place the results.
    pub async fn warm_load(
        &self,
        minerals: &[String],
        filters: &LocalityFilters,
    ) -> WarmLoadReport {
        if !self.source.has_credential() {
            tracing::warn!("skipping default-mineral warm load: MINDAT_API_KEY is not configured");
            return WarmLoadReport::default();
        }
        let fetched = warm::fetch_defaults(&self.source, minerals, filters).await;
        let mut controller = self.lock().await;
        let SearchController {
            registry,
            classifier,
            ..
        } = &mut *controller;
        warm::apply_defaults(registry, &*classifier, fetched)
    }

    async fn run<R: RenderSurface + ?Sized>(
        &self,
        lookup: Lookup<'_>,
        surface: &mut R,
    ) -> Result<SessionReport, SessionBusy> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let mut report = SessionReport::new(lookup.label(), Utc::now());

        if let Some(notice) = rejection(lookup, &self.source) {
            return Ok(rejected(report, notice, surface));
        }

        clear_previous(self.lock().await.registry_mut(), lookup);

        let mut status = SessionStatus::Validating;
        let guard = TriggerGuard::engage(surface, &mut status);
        tracing::info!(query = lookup.label(), "search session in flight");

        let fetched = fetch_bounded(&self.source, lookup, &self.options).await;
        let (terminal, notice) = {
            let mut controller = self.lock().await;
            let SearchController {
                registry,
                classifier,
                ..
            } = &mut *controller;
            conclude(
                registry,
                &*classifier,
                lookup,
                fetched,
                &mut report,
                &mut *guard.surface,
            )
        };
        Ok(close(guard, lookup, terminal, notice, report))
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
