// src/tests/api_tests.rs
//
// Fluxos HTTP completos sobre o armazenamento em memória.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    build_router,
    config::AppState,
    db::MemoryDocumentStore,
    models::auth::{CurrentUser, Role},
    services::{draft_sessions::DraftSessionStore, rca_draft::RCAS_COLLECTION, reference_resolver::CLIENTS_COLLECTION},
    tests::fixtures::approvable_posto,
};

struct TestApp {
    router: Router,
    state: AppState,
    memory: Arc<MemoryDocumentStore>,
}

impl TestApp {
    fn new() -> Self {
        let (state, memory) = AppState::in_memory("segredo-de-teste");
        Self { router: build_router(state.clone()), state, memory }
    }

    fn with_session_timeout(idle_timeout: Duration) -> Self {
        let (mut state, memory) = AppState::in_memory("segredo-de-teste");
        state.sessions = DraftSessionStore::with_idle_timeout(idle_timeout);
        Self { router: build_router(state.clone()), state, memory }
    }

    fn token(&self, role: Role) -> (CurrentUser, String) {
        let user = CurrentUser { id: Uuid::new_v4(), role };
        let token = self.state.auth_service.create_token(&user).unwrap();
        (user, token)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn open_draft(&self, token: &str, body: Value) -> String {
        let (status, view) = self.call(Method::POST, "/api/drafts", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{view}");
        view["id"].as_str().unwrap().to_string()
    }

    async fn operations(&self, token: &str, draft: &str, operations: Value) -> (StatusCode, Value) {
        let uri = format!("/api/drafts/{}/operations", draft);
        self.call(Method::POST, &uri, Some(token), Some(json!({ "operations": operations }))).await
    }

    async fn save(&self, token: &str, draft: &str, status: &str) -> (StatusCode, Value) {
        let uri = format!("/api/drafts/{}/save", draft);
        self.call(Method::POST, &uri, Some(token), Some(json!({ "status": status }))).await
    }
}

#[tokio::test]
async fn health_is_public_and_the_rest_requires_a_token() {
    let app = TestApp::new();

    let (status, _) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, "/api/catalog/activities", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/api/catalog/activities", Some("lixo"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_lists_activities_and_resolves_variants() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);

    let (status, activities) = app.call(Method::GET, "/api/catalog/activities", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activities.as_array().unwrap().len(), 8);

    let (status, _) = app
        .call(Method::GET, "/api/catalog/activities/Z/sub-activities", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, posto) = app
        .call(Method::GET, "/api/catalog/variants/F/F-06-01-7", Some(&token), None)
        .await;
    assert_eq!(posto["status"], "available");
    assert_eq!(posto["template"]["id"], "posto-combustiveis");

    let (_, placeholder) = app
        .call(Method::GET, "/api/catalog/variants/A/A-02-07-0", Some(&token), None)
        .await;
    assert_eq!(placeholder["status"], "notImplemented");
}

#[tokio::test]
async fn draft_is_edited_and_saved_as_rascunho() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);
    let draft = app.open_draft(&token, json!({})).await;

    let (status, view) = app
        .operations(
            &token,
            &draft,
            json!([
                { "op": "setActivity", "activity": "F" },
                { "op": "setSubActivity", "code": "F-06-01-7" },
                { "op": "set", "path": "empreendedor.nome", "value": "Auto Posto Serra Azul" },
                { "op": "append", "path": "modulo4.tanques" }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{view}");
    assert_eq!(view["activeFields"]["variantId"], "posto-combustiveis");
    assert_eq!(view["document"]["modulo4"]["tanques"].as_array().unwrap().len(), 1);
    assert_eq!(view["dirty"], true);

    // Rascunho grava mesmo incompleto
    let (status, outcome) = app.save(&token, &draft, "Rascunho").await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["created"], true);
    assert_eq!(outcome["report"]["mode"], "draft");
    assert_eq!(app.memory.count(RCAS_COLLECTION).await, 1);

    let (_, view) = app.call(Method::GET, &format!("/api/drafts/{}", draft), Some(&token), None).await;
    assert_eq!(view["dirty"], false);
    assert_eq!(view["rcaId"], outcome["id"]);

    // Aprovação bloqueia
    let (status, body) = app.save(&token, &draft, "Aprovado").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["empreendedor.cpfCnpj"].is_array());
}

#[tokio::test]
async fn complete_report_is_approved_and_listed() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Gestor);
    app.memory.seed(RCAS_COLLECTION, "rca-1", approvable_posto()).await;

    let draft = app.open_draft(&token, json!({ "rcaId": "rca-1" })).await;
    let (status, outcome) = app.save(&token, &draft, "Aprovado").await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["created"], false);
    assert_eq!(outcome["id"], "rca-1");

    let (_, approved) = app
        .call(Method::GET, "/api/rcas?status=Aprovado", Some(&token), None)
        .await;
    assert_eq!(approved.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::GET, "/api/rcas/inexistente", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_without_write_access_gets_forbidden_and_keeps_the_draft() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Comercial);
    let draft = app.open_draft(&token, json!({})).await;
    app.operations(&token, &draft, json!([{ "op": "setActivity", "activity": "G" }])).await;

    let (status, _) = app.save(&token, &draft, "Rascunho").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.memory.count(RCAS_COLLECTION).await, 0);

    let (_, view) = app.call(Method::GET, &format!("/api/drafts/{}", draft), Some(&token), None).await;
    assert_eq!(view["document"]["activity"], "G");
    assert_eq!(view["dirty"], true);
}

#[tokio::test]
async fn operation_batch_is_all_or_nothing() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);
    let draft = app.open_draft(&token, json!({})).await;

    let (status, _) = app
        .operations(
            &token,
            &draft,
            json!([
                { "op": "set", "path": "empreendimento.nome", "value": "Fazenda Boa Vista" },
                { "op": "remove", "path": "medidasControle", "index": 3 }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, view) = app.call(Method::GET, &format!("/api/drafts/{}", draft), Some(&token), None).await;
    assert_eq!(view["document"]["empreendimento"]["nome"], "");
}

#[tokio::test]
async fn sessions_are_invisible_to_other_users() {
    let app = TestApp::new();
    let (_, ana) = app.token(Role::Tecnico);
    let (_, bruno) = app.token(Role::Tecnico);
    let draft = app.open_draft(&ana, json!({})).await;

    let uri = format!("/api/drafts/{}", draft);
    let (status, _) = app.call(Method::GET, &uri, Some(&bruno), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::GET, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn selecting_a_client_fills_the_entrepreneur() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);
    app.memory
        .seed(
            CLIENTS_COLLECTION,
            "c1",
            json!({ "name": "Agropecuária Serra Azul", "cpfCnpj": "123.456.789-00", "entityType": "Produtor Rural" }),
        )
        .await;
    let draft = app.open_draft(&token, json!({})).await;

    let uri = format!("/api/drafts/{}/client", draft);
    let (status, view) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "id": "c1" }))).await;
    assert_eq!(status, StatusCode::OK, "{view}");
    assert_eq!(view["document"]["clientId"], "c1");
    assert_eq!(view["document"]["empreendedor"]["nome"], "Agropecuária Serra Azul");
    assert_eq!(view["document"]["empreendedor"]["tipoPessoa"], "Pessoa Física");

    let (status, _) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "id": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_selection_waits_for_references() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);

    app.memory.set_unavailable(true);
    let draft = app.open_draft(&token, json!({})).await;
    app.memory.set_unavailable(false);

    let uri = format!("/api/drafts/{}/client", draft);
    let (status, _) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "id": "c1" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let reload = format!("/api/drafts/{}/references/reload", draft);
    let (_, view) = app.call(Method::POST, &reload, Some(&token), None).await;
    assert_eq!(view["referencesLoaded"], true);

    let (status, _) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "id": "c1" }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn validate_reports_without_saving() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);
    let draft = app.open_draft(&token, json!({})).await;

    let uri = format!("/api/drafts/{}/validate", draft);
    let (status, report) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "mode": "final" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], false);

    let (_, report) = app.call(Method::POST, &uri, Some(&token), Some(json!({ "mode": "draft" }))).await;
    assert_eq!(report["valid"], true);
    assert_eq!(app.memory.count(RCAS_COLLECTION).await, 0);
}

#[tokio::test]
async fn removed_measure_does_not_come_back_on_reopen() {
    let app = TestApp::new();
    let (_, token) = app.token(Role::Tecnico);
    let draft = app.open_draft(&token, json!({})).await;

    app.operations(
        &token,
        &draft,
        json!([
            { "op": "setActivity", "activity": "G" },
            { "op": "append", "path": "medidasControle", "element": { "impacto": "Ruído", "medida": "Barreira" } }
        ]),
    )
    .await;
    let (_, outcome) = app.save(&token, &draft, "Rascunho").await;
    let rca_id = outcome["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .operations(&token, &draft, json!([{ "op": "remove", "path": "medidasControle", "index": 0 }]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.save(&token, &draft, "Rascunho").await;
    assert_eq!(status, StatusCode::OK);

    let reopened = app.open_draft(&token, json!({ "rcaId": rca_id })).await;
    let (_, view) = app.call(Method::GET, &format!("/api/drafts/{}", reopened), Some(&token), None).await;
    assert_eq!(view["document"]["medidasControle"], json!([]));
    assert_eq!(view["document"]["activity"], "G");
}

#[tokio::test]
async fn abandoned_session_answers_not_found() {
    let app = TestApp::with_session_timeout(Duration::from_millis(30));
    let (_, token) = app.token(Role::Tecnico);
    let draft = app.open_draft(&token, json!({})).await;

    tokio::time::sleep(Duration::from_millis(60)).await;

    let (status, _) = app.call(Method::GET, &format!("/api/drafts/{}", draft), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.state.sessions.len().await, 0);
}
