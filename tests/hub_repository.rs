mod support;

use datavault::error::DataVaultError;
use datavault::protocol::params;
use datavault::{BusinessErrorCode, DataVaultRepository, HubRepository};
use serde_json::json;
use std::sync::Arc;
use support::*;

fn customers(connection: &Arc<ScriptedConnection>) -> HubRepository<DvCustomer> {
    HubRepository::new(Arc::new(context(connection.clone())))
}

#[tokio::test]
async fn test_create_sends_hub_and_satellite_data() {
    let connection = ScriptedConnection::new();
    connection.on("CreateRecordCustomer", Reply::ok("A1"));

    let id = customers(&connection)
        .create(&DvCustomer::new("C-1", "Ann"))
        .await
        .unwrap();

    assert_eq!(id, "A1");
    let command = connection.last("CreateRecordCustomer").unwrap();
    assert_eq!(json_param(&command, params::HUB_DATA), json!({"BK_CUSTOMER_NUMBER": "C-1"}));
    assert_eq!(
        json_param(&command, params::SAT_DATA),
        json!({"SAT_CUSTOMER_DETAIL": {"NAME": "Ann"}})
    );

    let md = json_param(&command, params::MD);
    assert_eq!(md["MD_APP_ID"], "tests");
    assert_eq!(md["MD_USER_ID"], "tester");
    assert!(connection.events().contains(&"begin"));
}

#[tokio::test]
async fn test_get_decodes_dotted_result() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordCustomer", Reply::ok(&customer_row("A1", "C-1")));

    let customer = customers(&connection).get("A1", true).await.unwrap();

    assert_eq!(customer.hub.as_ref().unwrap().id.as_deref(), Some("A1"));
    assert_eq!(customer.detail.unwrap().name.as_deref(), Some("Customer C-1"));

    let command = connection.last("ReadRecordCustomer").unwrap();
    assert_eq!(json_param(&command, params::HUB_DATA), json!({"PK_CUSTOMER_ID": "A1"}));
    assert_eq!(json_param(&command, params::SAT_DATA), json!(["*"]));
    assert!(!connection.events().contains(&"begin"));
}

#[tokio::test]
async fn test_get_missing_entity() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordCustomer", Reply::ok(""));

    let repository = customers(&connection);
    assert!(repository.find("nope", false).await.unwrap().is_none());

    let err = repository.get("nope", false).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "There is no such an entity. Entity type: DvCustomer, id: nope");
}

#[tokio::test]
async fn test_get_by_bk() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordCustomer", Reply::ok(&customer_row("A1", "C-1")));

    let customer = customers(&connection).get_by_bk("C-1", false).await.unwrap();
    assert_eq!(customer.hub.unwrap().id.as_deref(), Some("A1"));

    let command = connection.last("ReadRecordCustomer").unwrap();
    assert_eq!(json_param(&command, params::HUB_DATA), json!({"BK_CUSTOMER_NUMBER": "C-1"}));
    assert_eq!(json_param(&command, params::SAT_DATA), json!([]));
}

#[tokio::test]
async fn test_get_by_bk_without_pk_is_not_found() {
    let connection = ScriptedConnection::new();
    connection.on(
        "ReadRecordCustomer",
        Reply::ok(r#"{"HUB_CUSTOMER.BK_CUSTOMER_NUMBER":"C-1"}"#),
    );

    let err = customers(&connection).get_by_bk("C-1", false).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_blank_update_skips_database() {
    let connection = ScriptedConnection::new();
    let customer = DvCustomer {
        hub: None,
        detail: Some(SatCustomerDetail::default()),
    };

    let id = customers(&connection).update("A1", &customer).await.unwrap();

    assert_eq!(id, "A1");
    assert!(connection.executed().is_empty());
    assert!(connection.events().is_empty());
}

#[tokio::test]
async fn test_update_sends_satellites_only() {
    let connection = ScriptedConnection::new();
    connection.on("UpdateRecordCustomer", Reply::ok("A1"));

    customers(&connection)
        .update("A1", &DvCustomer::new("C-1", "Bo"))
        .await
        .unwrap();

    let command = connection.last("UpdateRecordCustomer").unwrap();
    assert_eq!(command.input_text(params::HUB_PK), Some("A1"));
    assert_eq!(
        json_param(&command, params::SAT_DATA),
        json!({"SAT_CUSTOMER_DETAIL": {"NAME": "Bo"}})
    );
}

#[tokio::test]
async fn test_delete_checks_existence_first() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordCustomer", Reply::ok(&customer_row("A1", "C-1")));

    customers(&connection).delete("A1").await.unwrap();

    assert_eq!(connection.procedures(), vec!["ReadRecordCustomer", "DeleteRecordCustomer"]);
    let command = connection.last("DeleteRecordCustomer").unwrap();
    assert_eq!(command.input_text(params::HUB_PK), Some("A1"));
}

#[tokio::test]
async fn test_delete_missing_entity_fails_without_delete_call() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordCustomer", Reply::ok(""));

    let err = customers(&connection).delete("A1").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(connection.count("DeleteRecordCustomer"), 0);
}

#[tokio::test]
async fn test_business_error_from_status_code() {
    let connection = ScriptedConnection::new();
    connection.on(
        "CreateRecordCustomer",
        Reply::status("107", r#"{"message":"Business key is required"}"#),
    );

    let err = customers(&connection)
        .create(&DvCustomer::new("", "Ann"))
        .await
        .unwrap_err();

    assert_eq!(err.business_code(), Some(BusinessErrorCode::BusinessKeyIsRequired));
    assert_eq!(err.to_string(), "Business key is required");
    assert_eq!(err.command().unwrap().command_text, "CreateRecordCustomer");
}

#[tokio::test]
async fn test_check_exist_bks_reports_missing_keys() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordsCustomer", Reply::ok(&rows(&[customer_row("A1", "C-1")])));

    let bks = vec![
        "C-1".to_string(),
        "MISSING".to_string(),
        " ".to_string(),
        "MISSING".to_string(),
    ];
    let err = customers(&connection)
        .check_exist_bks_and_get_list(&bks, false)
        .await
        .unwrap_err();

    match err {
        DataVaultError::EntityNotFound { entity, id } => {
            assert_eq!(entity, "DvCustomer");
            assert_eq!(id, "MISSING");
        }
        other => panic!("unexpected error: {other}"),
    }

    let query = json_param(&connection.last("ReadRecordsCustomer").unwrap(), params::SAT_QUERY);
    let filter = query["filter"][0].as_str().unwrap();
    assert!(filter.starts_with("HUB_CUSTOMER.BK_CUSTOMER_NUMBER='C-1' OR "));
    assert!(!filter.contains("' '"));
}

#[tokio::test]
async fn test_check_exist_bks_returns_every_entity() {
    let connection = ScriptedConnection::new();
    connection.on(
        "ReadRecordsCustomer",
        Reply::ok(&rows(&[customer_row("A1", "C-1"), customer_row("A2", "C-2")])),
    );

    let bks = vec!["C-1".to_string(), "C-2".to_string()];
    let ids = customers(&connection).check_exist_bks_and_get_ids(&bks).await.unwrap();

    assert_eq!(ids, vec!["A1", "A2"]);
}

#[tokio::test]
async fn test_check_exist_pks_compares_primary_keys() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordsCustomer", Reply::ok(&rows(&[customer_row("A1", "C-1")])));

    let ids = vec!["A1".to_string(), "A9".to_string()];
    let err = customers(&connection)
        .check_exist_pks_and_get_list(&ids, true)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "There is no such an entity. Entity type: DvCustomer, id: A9");
    let query = json_param(&connection.last("ReadRecordsCustomer").unwrap(), params::SAT_QUERY);
    assert_eq!(
        query["filter"],
        json!(["HUB_CUSTOMER.PK_CUSTOMER_ID=UNHEX('A1') OR HUB_CUSTOMER.PK_CUSTOMER_ID=UNHEX('A9')"])
    );
    assert_eq!(query["select"], json!(["*"]));
}

#[tokio::test]
async fn test_empty_id_list_makes_no_call() {
    let connection = ScriptedConnection::new();
    let repository = customers(&connection);

    assert!(repository.get_list_by_ids(&[], true).await.unwrap().is_empty());
    assert!(repository.get_list_by_bks(&[], true).await.unwrap().is_empty());
    assert!(connection.executed().is_empty());
}

#[tokio::test]
async fn test_get_list_filters_by_satellite() {
    let connection = ScriptedConnection::new();
    connection.on("ReadRecordsCustomer", Reply::ok(&rows(&[customer_row("A1", "C-1")])));

    let sat = SatCustomerDetail {
        name: None,
        country: Some("VN".to_string()),
    };
    let found = customers(&connection).get_list(&sat, false).await.unwrap();

    assert_eq!(found.len(), 1);
    let query = json_param(&connection.last("ReadRecordsCustomer").unwrap(), params::SAT_QUERY);
    assert_eq!(query["filter"], json!(["SAT_CUSTOMER_DETAIL.COUNTRY='VN'"]));
    assert_eq!(query["select"], json!([]));
}

#[tokio::test]
async fn test_generate_unique_sequence() {
    let connection = ScriptedConnection::new();
    connection.on("GetUniqueSequence", Reply::ok("42"));

    let sequence = customers(&connection).generate_unique_sequence().await.unwrap();

    assert_eq!(sequence, "42");
    let command = connection.last("GetUniqueSequence").unwrap();
    assert_eq!(command.input_text(params::SEQ_NAME), Some("SEQ-CUSTOMER"));
}
