mod common;

use anyhow::Result;
use common::{seeded_store, BarrierStore, FlakyStore, HangingStore, SlowStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use venue_catalog::{
    params_from_query, CatalogError, CatalogService, ListingStore, Predicate, SchemaRegistry,
};

fn service(store: Arc<dyn ListingStore>) -> CatalogService {
    CatalogService::new(Arc::new(SchemaRegistry::with_builtin_categories()), store).with_concurrency(2)
}

#[tokio::test]
async fn test_list_all_is_union_of_single_category_lists() -> Result<()> {
    let catalog = service(seeded_store().await);
    let categories = ["banquetHall", "hotel", "djBooking", "caterer"];
    let predicates = vec![Predicate::Equals {
        field: "location.city".to_string(),
        value: "Kota".to_string(),
    }];

    let combined = catalog.list_all(&categories, &predicates).await?;

    let mut expected = 0;
    for category in categories {
        let single = catalog.list(category, &predicates).await?;
        assert!(single.iter().all(|l| l.category_key == category));
        expected += single.len();
    }
    assert_eq!(combined.len(), expected);
    assert_eq!(combined.len(), 4);

    // results stay grouped in request order
    let keys: Vec<&str> = combined.iter().map(|l| l.category_key.as_str()).collect();
    assert_eq!(keys, vec!["banquetHall", "banquetHall", "hotel", "djBooking"]);
    Ok(())
}

#[tokio::test]
async fn test_failed_category_degrades_without_failing_request() -> Result<()> {
    let flaky = FlakyStore::new(seeded_store().await, &["hotel"]);
    let catalog = service(Arc::new(flaky));

    let report = catalog.fan_out(&["banquetHall", "hotel", "djBooking"], &[]).await?;
    assert_eq!(report.failed, vec!["hotel"]);
    assert_eq!(report.listings.len(), 5);
    assert!(report.listings.iter().all(|l| l.category_key != "hotel"));

    let listings = catalog.list_all(&["hotel"], &[]).await?;
    assert!(listings.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_category_rejected_before_fetching() -> Result<()> {
    let catalog = service(seeded_store().await);
    let err = catalog.list_all(&["hotel", "spaceship"], &[]).await.unwrap_err();
    assert!(matches!(err, CatalogError::UnknownCategory { key } if key == "spaceship"));
    Ok(())
}

#[tokio::test]
async fn test_empty_category_list_returns_nothing() -> Result<()> {
    let catalog = service(seeded_store().await);
    let report = catalog.fan_out(&[], &[]).await?;
    assert!(report.listings.is_empty());
    assert!(report.failed.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_all_applies_category_specific_filters() -> Result<()> {
    let catalog = service(seeded_store().await);

    // minCapacity only exists for venue categories; djBooking ignores it.
    let report = catalog
        .search_all(&["banquetHall", "djBooking"], &params_from_query("minCapacity=300&city=Kota"))
        .await?;
    let ids: Vec<&str> = report.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "d1"]);
    Ok(())
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_fetches() -> Result<()> {
    let hanging = HangingStore::new(seeded_store().await, &["hotel"]);
    let catalog = Arc::new(service(Arc::new(hanging)));
    let cancel = CancellationToken::new();

    let task = {
        let catalog = catalog.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            catalog
                .list_all_with_cancel(&["banquetHall", "hotel"], &[], &cancel)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), task).await??;
    assert!(matches!(outcome, Err(CatalogError::Cancelled)));
    Ok(())
}

#[tokio::test]
async fn test_already_cancelled_token_short_circuits() -> Result<()> {
    let catalog = service(seeded_store().await);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = catalog.list_all_with_cancel(&["banquetHall"], &[], &cancel).await;
    assert!(matches!(outcome, Err(CatalogError::Cancelled)));
    Ok(())
}

#[tokio::test]
async fn test_categories_are_fetched_concurrently() -> Result<()> {
    let categories = ["banquetHall", "hotel", "djBooking", "caterer"];
    // no fetch can finish until all four are in flight together
    let gated = BarrierStore::new(seeded_store().await, categories.len());
    let catalog = CatalogService::new(Arc::new(SchemaRegistry::with_builtin_categories()), Arc::new(gated))
        .with_concurrency(categories.len());

    let listings = tokio::time::timeout(Duration::from_secs(5), catalog.list_all(&categories, &[])).await??;
    assert_eq!(listings.len(), 7);
    Ok(())
}

#[tokio::test]
async fn test_fan_out_takes_about_one_fetch_latency() -> Result<()> {
    let latency = Duration::from_millis(200);
    let slow = Arc::new(SlowStore::new(seeded_store().await, latency));
    let catalog = CatalogService::new(Arc::new(SchemaRegistry::with_builtin_categories()), slow.clone())
        .with_concurrency(4);

    let started = Instant::now();
    let report = catalog
        .fan_out(&["banquetHall", "hotel", "djBooking", "caterer"], &[])
        .await?;
    let elapsed = started.elapsed();

    assert!(report.failed.is_empty());
    assert!(elapsed < latency * 3, "fan-out took {:?}", elapsed);
    assert_eq!(slow.peak.load(Ordering::SeqCst), 4);
    Ok(())
}

#[tokio::test]
async fn test_fan_out_respects_concurrency_limit() -> Result<()> {
    let slow = Arc::new(SlowStore::new(seeded_store().await, Duration::from_millis(30)));
    let catalog = service(slow.clone());

    let listings = catalog
        .list_all(&["banquetHall", "hotel", "djBooking", "caterer", "resort"], &[])
        .await?;

    assert_eq!(listings.len(), 7);
    assert_eq!(slow.peak.load(Ordering::SeqCst), 2);
    Ok(())
}
