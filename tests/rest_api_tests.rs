//! End-to-end tests of the order REST API
//!
//! These tests verify the complete flow from HTTP request to response:
//! identity headers, access control, payload validation, the transfer rules
//! and the JSON error format.

use advertise::prelude::*;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Test Setup
// =============================================================================

fn create_test_server() -> TestServer {
    create_test_server_with(default_access())
}

fn create_test_server_with(access: ListAccess) -> TestServer {
    let store = Arc::new(InMemoryOrderStore::new());
    let orders = OrderDescriptor::new(OrderService::new(store, access));

    let app = ServerBuilder::new()
        .register_entity(orders)
        .build()
        .expect("Failed to build app");

    TestServer::new(app)
}

/// Attach the identity headers a gateway would forward
fn as_user(request: TestRequest, roles: &str) -> TestRequest {
    request
        .add_header(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        )
        .add_header(
            HeaderName::from_static("x-user-roles"),
            HeaderValue::from_str(roles).unwrap(),
        )
}

async fn create_order(server: &TestServer, number: &str) -> Value {
    let response = as_user(server.post("/orders"), "moderator")
        .json(&json!({"orderNumber": number, "name": "廣告"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn transfer(server: &TestServer, from: &Value, to: &Value) -> axum_test::TestResponse {
    as_user(
        server.patch(&format!("/orders/{}", from["id"].as_str().unwrap())),
        "moderator",
    )
    .json(&json!({"relatedOrder": {"connect": {"id": to["id"]}}}))
    .await
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = create_test_server();

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();

            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "advertise-admin");
        }
    }
}

// =============================================================================
// Order CRUD Tests
// =============================================================================

mod order_crud_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_order() {
        let server = create_test_server();

        let body = create_order(&server, "AD-0001").await;
        assert_eq!(body["orderNumber"], "AD-0001");
        assert_eq!(body["name"], "廣告");
        assert_eq!(body["state"], "paid");
        assert_eq!(body["nameEditable"], false);
        assert!(body["relatedOrder"].is_null());
        assert_eq!(body["createdAt"], body["updatedAt"]);
        assert!(body["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_get_order_by_id() {
        let server = create_test_server();
        let created = create_order(&server, "AD-0001").await;

        let response = as_user(
            server.get(&format!("/orders/{}", created["id"].as_str().unwrap())),
            "editor",
        )
        .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn test_list_orders_with_filter_and_paging() {
        let server = create_test_server();
        for number in ["AD-3", "AD-1", "AD-2"] {
            create_order(&server, number).await;
        }

        let response = as_user(server.get("/orders"), "editor")
            .add_query_param("sort", "order_number:asc")
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["count"], 3);
        let numbers: Vec<&str> = body["orders"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["orderNumber"].as_str().unwrap())
            .collect();
        assert_eq!(numbers, vec!["AD-1", "AD-2"]);

        let response = as_user(server.get("/orders?state=transferred"), "editor").await;
        let body: Value = response.json();
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_update_order_fields() {
        let server = create_test_server();
        let created = create_order(&server, "AD-0001").await;
        let id = created["id"].as_str().unwrap();

        let response = as_user(server.put(&format!("/orders/{}", id)), "admin")
            .json(&json!({
                "paragraphOne": "第一段",
                "scheduleStartDate": "2025-03-01T00:00:00Z",
                "scheduleEditable": true,
                "demoImage": {"connect": [{"id": Uuid::nil()}]}
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["paragraphOne"], "第一段");
        assert_eq!(body["scheduleEditable"], true);
        assert_eq!(body["demoImage"], json!([Uuid::nil()]));
        assert!(body["scheduleStartDate"].as_str().is_some());
        assert_eq!(body["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn test_delete_order() {
        let server = create_test_server();
        let created = create_order(&server, "AD-0001").await;
        let path = format!("/orders/{}", created["id"].as_str().unwrap());

        as_user(server.delete(&path), "admin")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        as_user(server.get(&path), "admin")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_list_states() {
        let server = create_test_server();

        let response = as_user(server.get("/orders/states"), "editor").await;
        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 13);
        assert_eq!(body[0], json!({"value": "paid", "label": "待上傳素材"}));
        assert_eq!(body[10]["value"], "transferred");
    }
}

// =============================================================================
// Access Control Tests
// =============================================================================

mod access_tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let server = create_test_server();

        let response = server.get("/orders").await;
        response.assert_status_unauthorized();

        let body: Value = response.json();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_unauthorized() {
        let server = create_test_server();

        server
            .get("/orders")
            .add_header(
                HeaderName::from_static("x-user-id"),
                HeaderValue::from_static("not-a-uuid"),
            )
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_role_matrix() {
        let server = create_test_server();
        let order = create_order(&server, "AD-0001").await;
        let path = format!("/orders/{}", order["id"].as_str().unwrap());

        // editors read but do not write
        as_user(server.get("/orders"), "editor").await.assert_status_ok();
        as_user(server.post("/orders"), "editor")
            .json(&json!({"orderNumber": "AD-0002", "name": "廣告"}))
            .await
            .assert_status_forbidden();

        // contributors see nothing
        as_user(server.get(&path), "contributor")
            .await
            .assert_status_forbidden();

        // moderators write but do not delete
        as_user(server.patch(&path), "moderator")
            .json(&json!({"name": "新名稱"}))
            .await
            .assert_status_ok();
        as_user(server.delete(&path), "moderator")
            .await
            .assert_status_forbidden();

        as_user(server.delete(&path), "editor,admin")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_configured_access_overrides() {
        let overrides = ListAccessConfig {
            query: Some("public".to_string()),
            ..Default::default()
        };
        let server = create_test_server_with(overrides.apply(default_access()).unwrap());

        server.get("/orders").await.assert_status_ok();
        server
            .post("/orders")
            .json(&json!({"orderNumber": "AD-0001", "name": "廣告"}))
            .await
            .assert_status_unauthorized();
    }
}

// =============================================================================
// Validation Tests
// =============================================================================

mod validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_name_longer_than_ten_characters_rejected() {
        let server = create_test_server();

        let response = as_user(server.post("/orders"), "admin")
            .json(&json!({"orderNumber": "AD-0001", "name": "這個名稱超過了十個字的限制"}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["fields"][0]["field"], "name");
    }

    #[tokio::test]
    async fn test_missing_required_fields_rejected() {
        let server = create_test_server();

        let response = as_user(server.post("/orders"), "admin")
            .json(&json!({"name": "廣告"}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["details"]["fields"][0]["field"], "orderNumber");
    }

    #[tokio::test]
    async fn test_duplicate_order_number_conflicts() {
        let server = create_test_server();
        create_order(&server, "AD-0001").await;

        let response = as_user(server.post("/orders"), "admin")
            .json(&json!({"orderNumber": "AD-0001", "name": "廣告"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let body: Value = response.json();
        assert_eq!(body["code"], "UNIQUE_VIOLATION");
        assert_eq!(body["details"]["field"], "orderNumber");
    }

    #[tokio::test]
    async fn test_unknown_state_is_bad_request() {
        let server = create_test_server();

        as_user(server.post("/orders"), "admin")
            .json(&json!({"orderNumber": "AD-0001", "name": "廣告", "state": "shipped"}))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_malformed_relation_is_bad_request() {
        let server = create_test_server();
        let order = create_order(&server, "AD-0001").await;

        let response = as_user(
            server.patch(&format!("/orders/{}", order["id"].as_str().unwrap())),
            "admin",
        )
        .json(&json!({"relatedOrder": {"connect": {"id": 7}}}))
        .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_RELATION");
    }

    #[tokio::test]
    async fn test_invalid_uuid_in_path() {
        let server = create_test_server();

        let response = as_user(server.get("/orders/not-a-uuid"), "admin").await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_get_missing_order_is_not_found() {
        let server = create_test_server();
        let id = Uuid::new_v4();

        let response = as_user(server.get(&format!("/orders/{}", id)), "admin").await;
        response.assert_status_not_found();

        let body: Value = response.json();
        assert_eq!(body["code"], "ENTITY_NOT_FOUND");
        assert_eq!(body["details"]["id"], id.to_string());
    }
}

// =============================================================================
// Transfer Tests
// =============================================================================

mod transfer_tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_scenario() {
        let server = create_test_server();
        let order1 = create_order(&server, "ORDER-1").await;
        let order2 = create_order(&server, "ORDER-2").await;

        let response = transfer(&server, &order1, &order2).await;
        response.assert_status_ok();
        let order1: Value = response.json();
        assert_eq!(order1["state"], "transferred");
        assert_eq!(order1["relatedOrder"], order2["id"]);

        let order3 = create_order(&server, "ORDER-3").await;
        let response = transfer(&server, &order3, &order2).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "MUTATION_REJECTED");
        assert_eq!(
            body["details"]["messages"],
            json!(["此訂單已經被其他訂單轉移過來，不能再次被選為目標"])
        );

        let response = transfer(&server, &order1, &order3).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(
            body["details"]["messages"],
            json!(["此訂單已經轉移過，不能再次修改轉移目標"])
        );
    }

    #[tokio::test]
    async fn test_deleting_transfer_target_conflicts() {
        let server = create_test_server();
        let source = create_order(&server, "ORDER-1").await;
        let target = create_order(&server, "ORDER-2").await;
        transfer(&server, &source, &target).await.assert_status_ok();

        let response = as_user(
            server.delete(&format!("/orders/{}", target["id"].as_str().unwrap())),
            "admin",
        )
        .await;
        response.assert_status(StatusCode::CONFLICT);

        let body: Value = response.json();
        assert_eq!(body["code"], "ENTITY_CONFLICT");
    }

    #[tokio::test]
    async fn test_list_orders_pointing_to_target() {
        let server = create_test_server();
        let source = create_order(&server, "ORDER-1").await;
        let target = create_order(&server, "ORDER-2").await;
        transfer(&server, &source, &target).await.assert_status_ok();

        let response = as_user(server.get("/orders"), "editor")
            .add_query_param("related_order", target["id"].as_str().unwrap())
            .await;
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["orders"][0]["id"], source["id"]);
    }
}
