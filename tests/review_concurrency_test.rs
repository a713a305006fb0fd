mod common;

use anyhow::Result;
use common::{dj, seeded_store};
use std::sync::Arc;
use venue_catalog::{round_one_decimal, CatalogEngine, ReviewInput, SchemaRegistry};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reviews_are_never_lost() -> Result<()> {
    let store = seeded_store().await;
    store.seed("djBooking", vec![dj("d9", "DJ Crowd", "Kota")]).await;
    let engine = Arc::new(CatalogEngine::new(SchemaRegistry::with_builtin_categories(), store));

    let ratings: Vec<f64> = (0..40).map(|i| f64::from(i % 5 + 1)).collect();

    let mut handles = Vec::new();
    for (i, rating) in ratings.iter().copied().enumerate() {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .reviews()
                .submit("djBooking", "d9", ReviewInput::new(&format!("guest-{}", i), rating, "Fun night"))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let listing = engine.catalog().get("djBooking", "d9").await?;
    assert_eq!(listing.reviews.len(), ratings.len());
    assert_eq!(listing.ratings.count as usize, ratings.len());

    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    assert_eq!(listing.ratings.average, round_one_decimal(mean));
    Ok(())
}

#[tokio::test]
async fn test_reviews_on_different_listings_do_not_interfere() -> Result<()> {
    let engine = Arc::new(CatalogEngine::new(
        SchemaRegistry::with_builtin_categories(),
        seeded_store().await,
    ));

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .reviews()
                .submit("djBooking", "d1", ReviewInput::new("A", 1.0, "Late"))
                .await
        })
    };
    let second = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .reviews()
                .submit("djBooking", "d2", ReviewInput::new("B", 5.0, "Superb"))
                .await
        })
    };

    let d1 = first.await??;
    let d2 = second.await??;
    assert_eq!((d1.count, d1.average), (3, 3.3));
    assert_eq!((d2.count, d2.average), (1, 5.0));
    Ok(())
}
