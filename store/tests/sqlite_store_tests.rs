use chrono::{Duration, TimeZone, Utc};
use market::{AlertEvent, PERCENT_UNIT, SecurityId, SecuritySnapshot};
use rust_decimal_macros::dec;
use store::{MetaInfo, SnapshotStore, SqliteSnapshotStore};
use uuid::Uuid;

/// Each test gets its own shared-cache in-memory database so they can run
/// in parallel without seeing each other's tables.
async fn setup_store() -> SqliteSnapshotStore {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    SqliteSnapshotStore::new(&url).await.unwrap()
}

fn sample_snapshot() -> SecuritySnapshot {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();

    let mut snap = SecuritySnapshot::new(SecurityId::new("BALN", "SIX"))
        .with_price(dec!(207.40))
        .with_currency("CHF")
        .with_change_percent(dec!(0.0467))
        .with_observed_at(t0);
    snap.alert_log
        .record(AlertEvent::new(t0, dec!(200.0), "CHF"));
    snap.alert_log
        .record(AlertEvent::new(t0 - Duration::hours(3), dec!(0.05), PERCENT_UNIT));
    snap
}

#[tokio::test]
async fn staged_snapshot_is_invisible_until_commit() -> anyhow::Result<()> {
    let store = setup_store().await;
    let snap = sample_snapshot();

    store.put(snap.clone()).await?;
    assert!(store.get(&snap.id()).await?.is_none());

    store.commit_changes().await?;
    assert_eq!(store.get(&snap.id()).await?, Some(snap));
    Ok(())
}

#[tokio::test]
async fn alert_log_survives_round_trip() -> anyhow::Result<()> {
    let store = setup_store().await;
    let snap = sample_snapshot();

    store.put(snap.clone()).await?;
    store.commit_changes().await?;

    let loaded = store.get(&snap.id()).await?.expect("snapshot persisted");
    assert_eq!(loaded.alert_log.len(), 2);
    assert_eq!(loaded.alert_log.events(), snap.alert_log.events());
    assert_eq!(loaded.price, Some(dec!(207.40)));
    assert_eq!(loaded.source_change_percent, Some(dec!(0.0467)));
    Ok(())
}

#[tokio::test]
async fn commit_upserts_existing_rows() -> anyhow::Result<()> {
    let store = setup_store().await;
    let snap = sample_snapshot();
    store.put(snap.clone()).await?;
    store.commit_changes().await?;

    let updated = snap.clone().with_price(dec!(190));
    store.put(updated).await?;
    store.commit_changes().await?;

    let all = store.list().await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].price, Some(dec!(190)));
    Ok(())
}

#[tokio::test]
async fn missing_price_is_stored_as_null() -> anyhow::Result<()> {
    let store = setup_store().await;
    let snap = SecuritySnapshot::new(SecurityId::new("HELN", "SIX"));

    store.put(snap.clone()).await?;
    store.commit_changes().await?;

    let loaded = store.get(&snap.id()).await?.unwrap();
    assert!(loaded.price.is_none());
    assert!(loaded.alert_log.is_empty());
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_by_identity() -> anyhow::Result<()> {
    let store = setup_store().await;
    for (sym, ex) in [("NESN", "SIX"), ("BALN", "XETRA"), ("BALN", "SIX")] {
        store.put(SecuritySnapshot::new(SecurityId::new(sym, ex))).await?;
    }
    store.commit_changes().await?;

    let ids: Vec<_> = store.list().await?.iter().map(|s| s.id().to_string()).collect();
    assert_eq!(ids, vec!["BALN::SIX", "BALN::XETRA", "NESN::SIX"]);
    Ok(())
}

#[tokio::test]
async fn meta_info_defaults_then_persists() -> anyhow::Result<()> {
    let store = setup_store().await;
    assert_eq!(store.get_meta_info().await?, MetaInfo::default());

    let meta = MetaInfo {
        version: Some("2".into()),
        last_cycle_at: Some(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()),
        ..Default::default()
    };
    store.put_meta_info(meta.clone()).await?;
    assert_eq!(store.get_meta_info().await?, MetaInfo::default());

    store.commit_changes().await?;
    assert_eq!(store.get_meta_info().await?, meta);
    Ok(())
}

#[tokio::test]
async fn empty_commit_is_a_no_op() -> anyhow::Result<()> {
    let store = setup_store().await;
    store.commit_changes().await?;
    assert!(store.list().await?.is_empty());
    Ok(())
}
