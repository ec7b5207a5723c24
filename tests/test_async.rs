//! Async wrapper tests. Run with `--features async`.

#![cfg(feature = "async")]

mod common;

use rate_history::{Access, AsyncRateHistory, NewRecord, QueryParams, RateError};

#[tokio::test]
async fn builder_opens_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    common::write_data_file(tmp.path(), common::SAMPLE_CSV);

    let history = AsyncRateHistory::builder()
        .data_dir(tmp.path())
        .build()
        .await
        .unwrap();

    let count = history.run(|h| h.rates().count()).await.unwrap();
    assert_eq!(count, 5);
}

#[tokio::test]
async fn search_and_history() {
    let (history, _tmp) = common::setup_sample_history();
    let history = AsyncRateHistory::from_history(history);

    let result = history.search(QueryParams::default()).await.unwrap();
    assert_eq!(result.total_records, 5);

    let recent = history.history(2).await.unwrap();
    assert_eq!(
        common::dates(&recent),
        ["2024-01-05 09:00:00", "2024-01-04 09:00:00"]
    );
}

#[tokio::test]
async fn append_then_undo() {
    let (history, _tmp) = common::setup_sample_history();
    let history = AsyncRateHistory::from_history(history);

    let record = NewRecord::new("2024-01-06 09:00:00", 4.4, 4.5, 4.0, 4.1);
    history.append(record, Access::Admin).await.unwrap();
    assert_eq!(history.run(|h| h.rates().count()).await.unwrap(), 6);

    history.undo(Access::Admin).await.unwrap();
    assert_eq!(history.run(|h| h.rates().count()).await.unwrap(), 5);
}

#[tokio::test]
async fn errors_pass_through() {
    let (history, _tmp) = common::setup_empty_history();
    let history = AsyncRateHistory::from_history(history);

    let err = history.undo(Access::Admin).await.unwrap_err();
    assert!(matches!(err, RateError::NoSnapshot));

    let record = NewRecord::new("2024-01-06 09:00:00", 4.4, 4.5, 4.0, 4.1);
    let err = history.append(record, Access::Anonymous).await.unwrap_err();
    assert!(matches!(err, RateError::Unauthorized));
}

#[tokio::test]
async fn clones_share_state() {
    let (history, _tmp) = common::setup_sample_history();
    let history = AsyncRateHistory::from_history(history);
    let other = history.clone();

    let record = NewRecord::new("2024-01-06 09:00:00", 4.4, 4.5, 4.0, 4.1);
    other.append(record, Access::Admin).await.unwrap();

    assert_eq!(history.run(|h| h.rates().count()).await.unwrap(), 6);
}
