use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use transaction_analyzer::{
    Dominance, StoreError, Transaction, TransactionId, TransactionStore,
};

fn two_month_store() -> TransactionStore {
    TransactionStore::new(vec![
        Transaction::from_value(json!({
            "id": 1, "type": "debit", "amount": 50, "date": "2019-01-10",
            "merchantName": "A", "description": "First"
        }))
        .unwrap(),
        Transaction::from_value(json!({
            "id": 2, "type": "credit", "amount": 30, "date": "2019-02-10",
            "merchantName": "B", "description": "Second"
        }))
        .unwrap(),
    ])
}

#[test]
fn test_two_month_scenario() {
    let store = two_month_store();

    assert_eq!(store.total_amount().unwrap(), dec!(80));
    assert_eq!(store.dominant_type(), Dominance::Equal);
    // One record in each month, the lower month wins.
    assert_eq!(store.most_active_month().unwrap(), 1);

    let january = store.by_date_range("2019-01-01", "2019-01-31").unwrap();
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].get_id(), &TransactionId::from(1i64));
}

#[test]
fn test_empty_store_scenario() {
    let store = TransactionStore::new(Vec::new());

    assert_eq!(store.total_amount().unwrap(), Decimal::ZERO);
    assert!(matches!(
        store.most_active_month(),
        Err(StoreError::EmptyCollection(_))
    ));
}

#[test]
fn test_freshly_appended_record_is_found() {
    let mut store = two_month_store();
    let fresh = Transaction::new(
        "fresh-id",
        "debit",
        dec!(12.34),
        "2019-03-01T10:00:00Z",
        "C",
        "Third",
    )
    .unwrap();
    store.add_transaction(fresh.clone());

    assert_eq!(store.find_by_id(&TransactionId::from("fresh-id")), Some(&fresh));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_load_sample_file() {
    let store = TransactionStore::from_path("data/transaction.json").unwrap();

    assert_eq!(store.len(), 10);
    assert_eq!(
        store.total_amount().unwrap(),
        store.total_debit().unwrap() + store.total_credit().unwrap()
    );
    assert_eq!(store.by_merchant("SuperMart").len(), 3);
    assert_eq!(store.by_date_range("2019-01-01", "2019-12-31").unwrap().len(), 10);
    assert_eq!(store.before("2019-06-01").unwrap().len(), 6);
    assert_eq!(store.after("2019-06-01").unwrap().len(), 3);
    assert!(store.find_by_id(&TransactionId::from(3i64)).is_none());
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        TransactionStore::from_path("data/does-not-exist.json"),
        Err(StoreError::Io(_))
    ));
}
