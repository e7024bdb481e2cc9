use hotel_ledger::core::{
    Currency, DateRange, EntryKind, LedgerOptions, build_ledger, fetch_sources,
};
use hotel_ledger::store::{Filter, RecordStore, RestStore, Row, Select, StoreError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "anon-key";

async fn mount_table(server: &MockServer, table: &str, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{table}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn select_sends_filters_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("select", "*"))
        .and(query_param("date", "gte.2024-01-01"))
        .and(query_param("date", "lte.2024-01-31"))
        .and(query_param("order", "date.desc"))
        .and(header("apikey", KEY))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "e1", "date": "2024-01-04"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let rows = tokio::task::spawn_blocking(move || {
        let store = RestStore::new(uri, KEY).unwrap();
        let query = Select::from("expenses")
            .filter(Filter::Gte("date".into(), json!("2024-01-01")))
            .filter(Filter::Lte("date".into(), json!("2024-01-31")))
            .order_by("date", true);
        store.select(&query).unwrap()
    })
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "e1");
    server.verify().await;
}

#[tokio::test]
async fn ledger_is_assembled_from_remote_tables() {
    let server = MockServer::start().await;
    mount_table(
        &server,
        "cash_sales",
        json!([{
            "id": "c1", "date": "2024-01-05", "item": "Rooms",
            "amount": 100.0, "currency": "USD"
        }]),
    )
    .await;
    mount_table(
        &server,
        "credit_sales",
        json!([{
            "id": "k1", "customer_name": "Acme", "item": "Restaurant",
            "original_amount": 50.0, "paid_amount": 0.0, "balance_due": 50.0,
            "currency": "USD", "issue_date": "2024-01-03", "status": "Pending"
        }]),
    )
    .await;
    mount_table(&server, "deposits", json!([])).await;
    mount_table(
        &server,
        "expenses",
        json!([{
            "id": "e1", "date": "2024-01-04", "category": "Utilities",
            "description": "Power", "amount": 30.0, "currency": "USD"
        }]),
    )
    .await;
    mount_table(&server, "credit_purchases", json!([])).await;

    let uri = server.uri();
    let ledger = tokio::task::spawn_blocking(move || {
        let store = RestStore::new(uri, KEY).unwrap();
        let sources = fetch_sources(&store, &DateRange::unbounded()).unwrap();
        build_ledger(&sources, &LedgerOptions::default())
    })
    .await
    .unwrap();
    let kinds: Vec<_> = ledger.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::CashSale, EntryKind::Expense, EntryKind::CreditIssued]
    );
    assert!(ledger.iter().all(|e| e.currency == Currency::Usd));
}

#[tokio::test]
async fn status_codes_map_to_store_errors() {
    let server = MockServer::start().await;
    for (table, status) in [("missing", 404u16), ("busy", 503), ("bad", 400)] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{table}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let uri = server.uri();
    let errors = tokio::task::spawn_blocking(move || {
        let store = RestStore::new(uri, KEY).unwrap();
        ["missing", "busy", "bad"]
            .map(|t| store.select(&Select::from(t)).unwrap_err())
    })
    .await
    .unwrap();
    assert_eq!(errors[0], StoreError::TableNotFound);
    assert!(matches!(errors[1], StoreError::Transient(_)));
    assert!(matches!(errors[2], StoreError::Permanent(_)));
}

#[tokio::test]
async fn insert_posts_row_and_update_detects_missing_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .and(header("prefer", "return=minimal"))
        .and(body_partial_json(json!({"id": "cu1", "name": "Guest"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/customers"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let update_err = tokio::task::spawn_blocking(move || {
        let mut store = RestStore::new(uri, KEY).unwrap();
        let mut row = Row::new();
        row.insert("id".into(), json!("cu1"));
        row.insert("name".into(), json!("Guest"));
        store.insert("customers", row.clone()).unwrap();
        store.update("customers", "ghost", row).unwrap_err()
    })
    .await
    .unwrap();
    assert_eq!(update_err, StoreError::RowNotFound);
    server.verify().await;
}
