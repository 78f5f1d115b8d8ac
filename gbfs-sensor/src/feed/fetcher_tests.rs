//! Unit tests for the throttled fetcher.

use super::*;
use crate::stations::{StationId, StationRegistry};
use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;

const STATUS_42: &str = r#"{"data":{"stations":[{"station_id":"42","num_bikes_available":5,"num_ebikes_available":1,"num_docks_available":10,"station_status":"active","last_reported":1000,"is_returning":true,"is_renting":true}]}}"#;

const INFO_42: &str = r#"{"data":{"stations":[{"station_id":"42","name":"Main St","lon":-122.1,"lat":37.4}]}}"#;

fn id(s: &str) -> StationId {
    StationId::from(s)
}

fn fetcher(feed: MockFeed) -> FeedFetcher<MockFeed> {
    FeedFetcher::new(feed, StationRegistry::new(), FetcherConfig::default())
}

fn fetcher_with(feed: MockFeed, info_refresh: InfoRefreshPolicy) -> FeedFetcher<MockFeed> {
    let config = FetcherConfig {
        info_refresh,
        ..FetcherConfig::default()
    };
    FeedFetcher::new(feed, StationRegistry::new(), config)
}

fn status_doc(entries: &[StationStatusEntry]) -> String {
    json!({ "data": { "stations": entries } }).to_string()
}

fn info_doc(entries: &[(&str, &str)]) -> String {
    let stations: Vec<_> = entries
        .iter()
        .map(|(id, name)| json!({ "station_id": id, "name": name, "lon": 0.0, "lat": 0.0 }))
        .collect();
    json!({ "data": { "stations": stations } }).to_string()
}

fn status_entry(station: &str, bikes: u32) -> StationStatusEntry {
    StationStatusEntry {
        station_id: id(station),
        num_bikes_available: bikes,
        num_ebikes_available: 0,
        num_docks_available: 8,
        station_status: "active".to_string(),
        last_reported: 2000,
        is_returning: true,
        is_renting: true,
    }
}

#[tokio::test(start_paused = true)]
async fn refresh_merges_both_documents() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));

    let outcome = fetcher.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Refreshed { stations: 1 });

    let record = fetcher.registry().get(&id("42")).await.unwrap();
    assert_eq!(record.name, "Main St");
    assert_eq!(record.lon, -122.1);
    assert_eq!(record.lat, 37.4);
    assert_eq!(record.num_bikes_available, Some(5));
    assert_eq!(record.num_ebikes_available, Some(1));
    assert_eq!(record.num_docks_available, Some(10));
    assert_eq!(record.station_status.as_deref(), Some("active"));
    assert_eq!(record.last_reported, Some(1000));
    assert_eq!(record.is_returning, Some(true));
    assert_eq!(record.is_renting, Some(true));
}

#[tokio::test(start_paused = true)]
async fn second_refresh_within_interval_is_throttled() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));

    fetcher.refresh().await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    let outcome = fetcher.refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Throttled);
    assert_eq!(fetcher.source().status_requests(), 1);
    assert_eq!(fetcher.source().info_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn refresh_resumes_once_interval_elapses() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));

    fetcher.refresh().await.unwrap();

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(fetcher.refresh().await.unwrap(), RefreshOutcome::Throttled);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(
        fetcher.refresh().await.unwrap(),
        RefreshOutcome::Refreshed { stations: 1 }
    );

    assert_eq!(fetcher.source().status_requests(), 2);
    assert_eq!(fetcher.source().info_requests(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_refreshes_share_one_round_trip() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));

    let (a, b) = tokio::join!(fetcher.refresh(), fetcher.refresh());
    let outcomes = [a.unwrap(), b.unwrap()];

    assert!(outcomes.contains(&RefreshOutcome::Throttled));
    assert!(outcomes.contains(&RefreshOutcome::Refreshed { stations: 1 }));
    assert_eq!(fetcher.source().status_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn force_refresh_ignores_throttle() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));

    fetcher.refresh().await.unwrap();
    let outcome = fetcher.force_refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Refreshed { stations: 1 });
    assert_eq!(fetcher.source().status_requests(), 2);
}

#[tokio::test(start_paused = true)]
async fn info_only_station_has_null_status() {
    let feed = MockFeed::new(
        STATUS_42,
        info_doc(&[("42", "Main St"), ("43", "Side St")]),
    );
    let fetcher = fetcher(feed);

    fetcher.refresh().await.unwrap();

    let record = fetcher.registry().get(&id("43")).await.unwrap();
    assert_eq!(record.name, "Side St");
    assert_eq!(record.num_bikes_available, None);
    assert_eq!(record.num_ebikes_available, None);
    assert_eq!(record.num_docks_available, None);
    assert_eq!(record.station_status, None);
    assert_eq!(record.last_reported, None);
    assert_eq!(record.is_returning, None);
    assert_eq!(record.is_renting, None);
}

#[tokio::test(start_paused = true)]
async fn new_status_station_is_populated_in_same_cycle() {
    let feed = MockFeed::new(status_doc(&[status_entry("1", 3)]), info_doc(&[("1", "One")]));
    let fetcher = fetcher(feed);
    fetcher.refresh().await.unwrap();

    // Station 2 appears in both documents.
    fetcher
        .source()
        .set_status(status_doc(&[status_entry("1", 3), status_entry("2", 6)]));
    fetcher
        .source()
        .set_info(info_doc(&[("1", "One"), ("2", "Two")]));
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;
    fetcher.refresh().await.unwrap();

    let record = fetcher.registry().get(&id("2")).await.unwrap();
    assert_eq!(record.name, "Two");
    assert_eq!(record.num_bikes_available, Some(6));
    assert!(record.has_status());
}

#[tokio::test(start_paused = true)]
async fn status_station_missing_from_info_is_not_created() {
    let feed = MockFeed::new(
        status_doc(&[status_entry("1", 3), status_entry("ghost", 1)]),
        info_doc(&[("1", "One")]),
    );
    let fetcher = fetcher(feed);

    assert_eq!(
        fetcher.refresh().await.unwrap(),
        RefreshOutcome::Refreshed { stations: 1 }
    );
    assert_eq!(fetcher.registry().get(&id("ghost")).await, None);
}

#[tokio::test(start_paused = true)]
async fn always_policy_fetches_info_every_cycle() {
    let feed = MockFeed::new(status_doc(&[status_entry("1", 3)]), info_doc(&[("1", "One")]));
    let fetcher = fetcher(feed);
    fetcher.refresh().await.unwrap();

    fetcher.source().set_info(info_doc(&[("1", "Renamed")]));
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;
    fetcher.refresh().await.unwrap();

    assert_eq!(fetcher.source().info_requests(), 2);
    assert_eq!(fetcher.registry().get(&id("1")).await.unwrap().name, "Renamed");
}

#[tokio::test(start_paused = true)]
async fn on_demand_policy_skips_info_for_known_stations() {
    let feed = MockFeed::new(status_doc(&[status_entry("1", 3)]), info_doc(&[("1", "One")]));
    let fetcher = fetcher_with(feed, InfoRefreshPolicy::OnDemand);

    // Empty registry: info is needed.
    fetcher.refresh().await.unwrap();
    assert_eq!(fetcher.source().info_requests(), 1);

    // Known stations only: info skipped, status still applied.
    fetcher.source().set_status(status_doc(&[status_entry("1", 9)]));
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;
    fetcher.refresh().await.unwrap();
    assert_eq!(fetcher.source().info_requests(), 1);
    assert_eq!(
        fetcher.registry().get(&id("1")).await.unwrap().num_bikes_available,
        Some(9)
    );

    // A new station in status: info fetched again.
    fetcher
        .source()
        .set_status(status_doc(&[status_entry("1", 9), status_entry("2", 4)]));
    fetcher
        .source()
        .set_info(info_doc(&[("1", "One"), ("2", "Two")]));
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;
    fetcher.refresh().await.unwrap();
    assert_eq!(fetcher.source().info_requests(), 2);
    assert_eq!(
        fetcher.registry().get(&id("2")).await.unwrap().num_bikes_available,
        Some(4)
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_status_keeps_registry_and_window() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));
    fetcher.refresh().await.unwrap();
    let before = fetcher.registry().get(&id("42")).await;
    let refreshed_at = fetcher.last_refresh().await;

    fetcher.source().set_status("<html>502 Bad Gateway</html>");
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;
    let result = fetcher.refresh().await;

    assert!(matches!(result, Err(FeedError::Json { .. })));
    assert_eq!(fetcher.registry().get(&id("42")).await, before);
    assert_eq!(fetcher.last_refresh().await, refreshed_at);
    // Info is never requested once status has failed.
    assert_eq!(fetcher.source().info_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_info_discards_status_of_same_cycle() {
    let fetcher = fetcher(MockFeed::new(STATUS_42, INFO_42));
    fetcher.refresh().await.unwrap();

    fetcher.source().set_status(status_doc(&[status_entry("42", 0)]));
    fetcher.source().set_info("{\"data\":");
    tokio::time::advance(DEFAULT_MIN_REFRESH).await;

    assert!(fetcher.refresh().await.is_err());
    assert_eq!(
        fetcher.registry().get(&id("42")).await.unwrap().num_bikes_available,
        Some(5)
    );
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_is_retried_on_next_call() {
    let feed = MockFeed::new("not json", INFO_42);
    let fetcher = fetcher(feed);

    assert!(fetcher.refresh().await.is_err());
    assert_eq!(fetcher.last_refresh().await, None);

    fetcher.source().set_status(STATUS_42);
    let outcome = fetcher.refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Refreshed { stations: 1 });
    assert_eq!(fetcher.source().status_requests(), 2);
}

fn arb_status() -> impl Strategy<Value = (u32, u32, u32, bool, i64, bool, bool)> {
    (
        0u32..100,
        0u32..20,
        0u32..60,
        any::<bool>(),
        0i64..2_000_000_000,
        any::<bool>(),
        any::<bool>(),
    )
}

fn entries_from(
    values: &[(u32, u32, u32, bool, i64, bool, bool)],
) -> Vec<StationStatusEntry> {
    values
        .iter()
        .enumerate()
        .map(
            |(i, &(bikes, ebikes, docks, active, reported, returning, renting))| {
                StationStatusEntry {
                    station_id: StationId::new(format!("s{i}")),
                    num_bikes_available: bikes,
                    num_ebikes_available: ebikes,
                    num_docks_available: docks,
                    station_status: if active { "active" } else { "maintenance" }.to_string(),
                    last_reported: reported,
                    is_returning: returning,
                    is_renting: renting,
                }
            },
        )
        .collect()
}

proptest! {
    /// After a refresh, each station's status fields equal the latest
    /// status document, whatever the previous cycle held.
    #[test]
    fn status_fields_match_latest_document(
        first in prop::collection::vec(arb_status(), 1..12),
        second in prop::collection::vec(arb_status(), 1..12),
    ) {
        let first = entries_from(&first);
        let second = entries_from(&second);
        let names: Vec<(String, String)> = (0..first.len().max(second.len()))
            .map(|i| (format!("s{i}"), format!("Station {i}")))
            .collect();
        let name_refs: Vec<(&str, &str)> =
            names.iter().map(|(i, n)| (i.as_str(), n.as_str())).collect();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let records = rt.block_on(async {
            let fetcher = fetcher(MockFeed::new(status_doc(&first), info_doc(&name_refs)));
            fetcher.force_refresh().await.unwrap();

            fetcher.source().set_status(status_doc(&second));
            fetcher.force_refresh().await.unwrap();

            let mut records = Vec::new();
            for entry in &second {
                records.push(fetcher.registry().get(&entry.station_id).await);
            }
            records
        });

        for (entry, record) in second.iter().zip(records) {
            let record = record.unwrap();
            prop_assert_eq!(record.num_bikes_available, Some(entry.num_bikes_available));
            prop_assert_eq!(record.num_ebikes_available, Some(entry.num_ebikes_available));
            prop_assert_eq!(record.num_docks_available, Some(entry.num_docks_available));
            prop_assert_eq!(record.station_status.as_deref(), Some(entry.station_status.as_str()));
            prop_assert_eq!(record.last_reported, Some(entry.last_reported));
            prop_assert_eq!(record.is_returning, Some(entry.is_returning));
            prop_assert_eq!(record.is_renting, Some(entry.is_renting));
        }
    }
}
