use std::time::Duration;

use lithocore_core::{parse_sites, Category, Coordinate};

use super::*;
use crate::surface::{NoticeLevel, RecordingSurface};
use crate::testing::{provider_failure, raw, FakeSource};
use crate::warm::seed_authored_layers;

fn controller(source: FakeSource) -> SearchController<FakeSource> {
    SearchController::new(source, LexiconClassifier, SearchOptions::default())
}

fn quarz_source() -> FakeSource {
    FakeSource::default().with_mineral(
        "Quarz",
        Ok(vec![
            raw(1, "Quarz-Stollen", Some(46.62), Some(8.59)),
            raw(2, "Alpweide", Some(46.55), Some(8.41)),
        ]),
    )
}

fn seeded_marker() -> Marker {
    Marker {
        geometry: crate::registry::Geometry::Point(Coordinate::new(47.0, 9.0).unwrap()),
        title: "previous".to_string(),
        mineral: None,
        description: String::new(),
        explanation: String::new(),
        route_link: None,
        color: None,
        origin: MarkerOrigin::Search,
    }
}

#[tokio::test]
async fn classified_search_splits_official_and_unofficial() {
    let mut controller = controller(quarz_source());
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Success);
    assert_eq!(report.placed, 2);
    assert_eq!(controller.registry().len(Category::Official), 1);
    assert_eq!(controller.registry().len(Category::Unofficial), 1);
    assert_eq!(
        controller.registry().bucket(Category::Official)[0].title,
        "Quarz-Stollen"
    );

    assert_eq!(surface.fitted.len(), 1);
    let bounds = surface.fitted[0];
    for point in controller
        .registry()
        .all_points(&[Category::Official, Category::Unofficial])
    {
        assert!(bounds.contains(point));
    }
    assert_eq!(report.bounds, Some(bounds));
    assert!(surface.shown_layers.contains(&Category::Official));
    assert!(surface.shown_layers.contains(&Category::Unofficial));
}

#[tokio::test]
async fn trigger_is_disabled_then_restored_once_on_success() {
    let mut controller = controller(quarz_source());
    let mut surface = RecordingSurface::new();

    controller.submit("Quarz", &mut surface).await;

    assert_eq!(surface.trigger_changes, vec![false, true]);
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn null_coordinates_end_empty_without_viewport_change() {
    let source =
        FakeSource::default().with_mineral("Quarz", Ok(vec![raw(1, "Alpweide", None, None)]));
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Empty);
    assert_eq!(report.placed, 0);
    assert_eq!(report.unplaceable, 1);
    assert!(report.bounds.is_none());
    assert!(surface.fitted.is_empty());
    assert!(controller
        .registry()
        .all_points(&[Category::Official, Category::Unofficial])
        .is_empty());
    assert_eq!(surface.trigger_restorations(), 1);
    assert_eq!(surface.notices.len(), 1);
}

#[tokio::test]
async fn zero_records_end_empty() {
    let mut controller = controller(FakeSource::default());
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Unobtainium", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Empty);
    assert!(report
        .notice
        .as_ref()
        .is_some_and(|n| n.message.contains("Unobtainium")));
}

#[tokio::test]
async fn blank_query_issues_no_request() {
    let mut controller = controller(quarz_source());
    let mut surface = RecordingSurface::new();

    let report = controller.submit("   ", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Idle);
    assert_eq!(controller.source().calls(), 0);
    assert!(surface.trigger_changes.is_empty());
    assert_eq!(surface.notices[0].level, NoticeLevel::Warning);
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn missing_credential_issues_no_request() {
    let source = FakeSource {
        credential: false,
        ..quarz_source()
    };
    let mut controller = controller(source);
    controller
        .registry_mut()
        .add_marker(Category::SearchResult, seeded_marker());
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Idle);
    assert_eq!(controller.source().calls(), 0);
    assert_eq!(surface.notices[0].level, NoticeLevel::Error);
    // Aborted before clearing anything.
    assert_eq!(controller.registry().len(Category::SearchResult), 1);
}

#[tokio::test]
async fn provider_failure_ends_failed_and_restores_trigger_once() {
    let source = FakeSource::default().with_mineral("Quarz", Err(provider_failure()));
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Failed);
    assert!(matches!(report.failure, Some(SessionFailure::Provider(_))));
    assert_eq!(surface.trigger_restorations(), 1);
    assert!(surface.trigger_enabled());
    assert_eq!(controller.status(), SessionStatus::Idle);

    let notice = report.notice.expect("failure notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(!notice.message.contains("503"));
}

#[tokio::test]
async fn description_failure_fails_classified_session() {
    let source = FakeSource {
        description: Err(provider_failure()),
        ..quarz_source()
    };
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Failed);
    assert_eq!(controller.registry().len(Category::Official), 0);
}

#[tokio::test]
async fn classified_search_returns_mineral_description() {
    let source = FakeSource {
        description: Ok(Some("Siliziumdioxid, trigonal.".to_string())),
        ..quarz_source()
    };
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(
        report.mineral_description.as_deref(),
        Some("Siliziumdioxid, trigonal.")
    );
    assert_eq!(controller.source().calls(), 2);
}

#[tokio::test]
async fn deadline_expiry_ends_failed() {
    let source = FakeSource {
        hang: true,
        ..quarz_source()
    };
    let options = SearchOptions {
        deadline: Duration::from_millis(50),
        ..SearchOptions::default()
    };
    let mut controller = SearchController::new(source, LexiconClassifier, options);
    let mut surface = RecordingSurface::new();

    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Failed);
    assert!(matches!(
        report.failure,
        Some(SessionFailure::DeadlineExceeded(_))
    ));
    assert_eq!(surface.trigger_restorations(), 1);
}

#[tokio::test]
async fn dropped_session_still_restores_trigger() {
    let source = FakeSource {
        hang: true,
        ..quarz_source()
    };
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        controller.submit("Quarz", &mut surface),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(surface.trigger_changes, vec![false, true]);
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn classified_search_clears_previous_results() {
    let mut controller = controller(quarz_source());
    for category in [Category::SearchResult, Category::Official, Category::Unofficial] {
        controller.registry_mut().add_marker(category, seeded_marker());
    }
    let mut surface = RecordingSurface::new();

    controller.submit("Quarz", &mut surface).await;

    assert_eq!(controller.registry().len(Category::SearchResult), 0);
    assert_eq!(controller.registry().len(Category::Official), 1);
    assert_eq!(controller.registry().len(Category::Unofficial), 1);
}

#[tokio::test]
async fn results_only_search_fills_search_result_bucket() {
    let mut controller = controller(quarz_source());
    controller
        .registry_mut()
        .add_marker(Category::Official, seeded_marker());
    let mut surface = RecordingSurface::new();

    let report = controller
        .submit_with_mode("Quarz", SearchMode::ResultsOnly, &mut surface)
        .await;

    assert_eq!(report.status, SessionStatus::Success);
    assert_eq!(controller.registry().len(Category::SearchResult), 2);
    // Classified buckets are left alone in this mode.
    assert_eq!(controller.registry().len(Category::Official), 1);
    assert_eq!(controller.source().calls(), 1);
    assert_eq!(surface.shown_layers, vec![Category::SearchResult]);
}

#[tokio::test]
async fn select_mineral_loads_by_id() {
    let mut source = FakeSource::default();
    source.by_id.insert(
        3337,
        Ok(vec![
            raw(10, "Lengenbach", Some(46.364), Some(8.22)),
            raw(11, "Ohne Koordinaten", None, Some(8.0)),
        ]),
    );
    let mut controller = controller(source);
    let mut surface = RecordingSurface::new();

    let report = controller.select_mineral(3337, "Quartz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Success);
    assert_eq!(report.placed, 1);
    assert_eq!(report.unplaceable, 1);
    let marker = &controller.registry().bucket(Category::SearchResult)[0];
    assert_eq!(marker.mineral.as_deref(), Some("Quartz"));
    assert!(marker.route_link.is_some());
}

#[tokio::test]
async fn select_mineral_rejects_invalid_id() {
    let mut controller = controller(FakeSource::default());
    let mut surface = RecordingSurface::new();

    let report = controller.select_mineral(0, "Quartz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Idle);
    assert_eq!(controller.source().calls(), 0);
}

#[test]
fn search_mode_parses_aliases() {
    assert_eq!("classified".parse::<SearchMode>(), Ok(SearchMode::Classified));
    assert_eq!("Results".parse::<SearchMode>(), Ok(SearchMode::ResultsOnly));
    assert_eq!("resultsOnly".parse::<SearchMode>(), Ok(SearchMode::ResultsOnly));
    assert!("both".parse::<SearchMode>().is_err());
}

#[test]
fn report_never_serializes_failure_detail() {
    let mut report = SessionReport::new("Quarz", Utc::now());
    report.status = SessionStatus::Failed;
    report.failure = Some(SessionFailure::Provider(provider_failure()));
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("failure").is_none());
    assert_eq!(json["status"], "failed");
}

fn titles(controller: &SearchController<FakeSource>, category: Category) -> Vec<String> {
    controller
        .registry()
        .bucket(category)
        .iter()
        .map(|m| m.title.clone())
        .collect()
}

#[tokio::test]
async fn authored_and_warm_loaded_markers_survive_classified_search() {
    let sites = parse_sites(
        r"
sites:
  - category: official
    name: Gonzen Bergwerk
    mineral: Hämatit
    latitude: 47.0686
    longitude: 9.4383
    description: Former iron mine.
  - category: unofficial
    name: Grimsel Kristallkluft
    mineral: Quarz
    latitude: 46.57
    longitude: 8.33
    description: Alpine fissure.
",
    )
    .unwrap();
    let source = quarz_source().with_mineral(
        "Fluorit",
        Ok(vec![raw(9, "Alpweide Fluorit", Some(46.9), Some(8.9))]),
    );
    let mut controller = controller(source);
    seed_authored_layers(controller.registry_mut(), &sites);
    controller
        .warm_load(&["Fluorit".to_string()], &LocalityFilters::default())
        .await;
    let mut surface = RecordingSurface::new();

    controller.submit("Quarz", &mut surface).await;
    // A second search replaces only the first search's markers.
    let report = controller.submit("Quarz", &mut surface).await;

    assert_eq!(report.status, SessionStatus::Success);
    assert_eq!(
        titles(&controller, Category::Official),
        vec!["Gonzen Bergwerk", "Quarz-Stollen"]
    );
    assert_eq!(
        titles(&controller, Category::Unofficial),
        vec!["Grimsel Kristallkluft", "Alpweide Fluorit", "Alpweide"]
    );

    // The viewport fits this search's results, not the persistent markers.
    let bounds = report.bounds.expect("bounds");
    assert!(bounds.contains(Coordinate::new(46.62, 8.59).unwrap()));
    assert!(!bounds.contains(Coordinate::new(47.0686, 9.4383).unwrap()));
}

fn hanging_shared() -> SharedSearchController<FakeSource> {
    let source = FakeSource {
        hang: true,
        ..quarz_source()
    };
    let options = SearchOptions {
        deadline: Duration::from_millis(300),
        ..SearchOptions::default()
    };
    SharedSearchController::new(SearchController::new(source, LexiconClassifier, options))
}

#[tokio::test]
async fn shared_controller_rejects_overlapping_session() {
    let shared = hanging_shared();
    let first = {
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut surface = RecordingSurface::new();
            shared
                .try_submit("Quarz", SearchMode::Classified, &mut surface)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(shared.is_busy());

    let mut surface = RecordingSurface::new();
    let outcome = shared
        .try_submit("Quarz", SearchMode::Classified, &mut surface)
        .await;
    assert_eq!(outcome.unwrap_err(), SessionBusy);
    assert!(surface.trigger_changes.is_empty());

    let report = first.await.unwrap().expect("first session ran");
    assert_eq!(report.status, SessionStatus::Failed);
    assert!(!shared.is_busy());
}

#[tokio::test]
async fn layer_reads_do_not_wait_for_an_in_flight_session() {
    let shared = hanging_shared();
    let session = {
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut surface = RecordingSurface::new();
            shared
                .try_submit("Quarz", SearchMode::Classified, &mut surface)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(shared.is_busy());

    let snapshot = tokio::time::timeout(Duration::from_millis(100), shared.snapshot()).await;
    assert!(snapshot.is_ok());
    let toggle = tokio::time::timeout(
        Duration::from_millis(100),
        shared.set_layer_visible(Category::Potential, true),
    )
    .await;
    assert!(toggle.is_ok());

    session.await.unwrap().expect("session ran");
}

#[tokio::test]
async fn held_registry_lock_does_not_make_search_busy() {
    let shared = SharedSearchController::new(controller(quarz_source()));
    let held = shared.lock().await;
    assert!(!shared.is_busy());

    let search = {
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut surface = RecordingSurface::new();
            shared
                .try_submit("Quarz", SearchMode::Classified, &mut surface)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(held);

    let report = search
        .await
        .unwrap()
        .expect("a reader holding the registry is not a running session");
    assert_eq!(report.status, SessionStatus::Success);
    assert_eq!(shared.snapshot().await[0].count, 1);
}
