mod common;

use std::time::Duration;

use clinicdesk::api::ApiError;
use clinicdesk::domain::{DoctorCredentials, UserRecord};
use clinicdesk::session::{AuthToken, SessionState};
use clinicdesk::storage::{keys, StorageOp};
use clinicdesk::StoreError;
use common::{
    appointment, at, doctor, logged_in_store, make_store, patient, MockBackend, MockResponse,
};
use serde_json::json;

#[tokio::test]
async fn doctor_login_persists_the_session() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({
            "token": "tok-doc",
            "user": {"id": 7, "nombre": "Ana", "rol": "doctor", "id_doctor": 3}
        })))
        .await;
    let (storage, store) = make_store(&backend.base_url());

    let user = store.login_doctor("3", "pw").await.unwrap();

    assert_eq!(user.name, "Ana");
    assert!(store.session().is_authenticated());
    assert!(!store.session().is_admin());
    assert_eq!(storage.peek(keys::USER_TOKEN).as_deref(), Some("tok-doc"));
    assert_eq!(storage.peek(keys::AUTH_TOKEN).as_deref(), Some("tok-doc"));
    assert!(storage.peek(keys::USER_DATA).is_some());
}

#[tokio::test]
async fn admin_login_grants_admin_rights() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({
            "token": "tok-admin",
            "user": {"id": 1, "usuario": "root", "rol": "Admin"}
        })))
        .await;
    let (_storage, store) = make_store(&backend.base_url());

    store.login_admin("root", "pw").await.unwrap();
    assert!(store.session().is_admin());
}

#[tokio::test]
async fn login_that_cannot_be_saved_is_reported() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({
            "token": "tok",
            "user": {"id": 1, "rol": "doctor"}
        })))
        .await;
    let (storage, store) = make_store(&backend.base_url());
    storage.fail_on(StorageOp::Set, keys::USER_DATA);

    let err = store.login_doctor("1", "pw").await.unwrap_err();

    assert!(matches!(err, StoreError::SessionNotPersisted));
    assert!(!store.session().is_authenticated());
    assert!(storage.peek(keys::USER_TOKEN).is_none());
}

#[tokio::test]
async fn failed_login_leaves_session_untouched() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(422, "Credenciales incorrectas"))
        .await;
    let (_storage, store) = make_store(&backend.base_url());

    let err = store.login_doctor("1", "bad").await.unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Status { status: 422, .. })));
    assert_eq!(store.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn unauthorized_refresh_clears_the_session() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(401, "Unauthenticated."))
        .await;
    let (storage, store) = logged_in_store(&backend.base_url(), "doctor");

    let err = store.refresh_patients().await.unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert_eq!(store.session_state(), SessionState::Unauthenticated);
    assert!(storage.peek(keys::USER_TOKEN).is_none());
    assert!(storage.peek(keys::USER_DATA).is_none());
}

#[tokio::test]
async fn refresh_replaces_cached_collection() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!([
            {"id": 1, "name": "Marta", "age": 34, "phone": "555"},
            {"id": 2, "name": "Iker", "age": "8", "phone": "556"}
        ])))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");
    store.cache().add_patient(patient("local-only"));

    assert!(store.refresh_patients().await.unwrap());

    let ids: Vec<_> = store.cache().patients().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_collection() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(500, "Server Error"))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");
    store.cache().set_doctors(vec![doctor("d1")]);

    assert!(store.refresh_doctors().await.is_err());

    assert_eq!(store.cache().doctors(), vec![doctor("d1")]);
    assert!(store.session().is_authenticated());
}

#[tokio::test]
async fn refresh_patients_requires_login() {
    let backend = MockBackend::start().await;
    let (_storage, store) = make_store(&backend.base_url());

    let err = store.refresh_patients().await.unwrap_err();

    assert!(matches!(err, StoreError::NotAuthenticated));
    assert!(backend.captured_requests().await.is_empty());
}

#[tokio::test]
async fn anonymous_doctor_refresh_uses_public_list() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!([{"id": 4, "nombre": "Luis"}])))
        .await;
    let (_storage, store) = make_store(&backend.base_url());

    assert!(store.refresh_doctors().await.unwrap());

    assert_eq!(store.cache().doctors()[0].name, "Luis");
    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/api/doctores-lista");
}

#[tokio::test]
async fn stale_refresh_is_discarded() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(
            MockResponse::success(json!([{"id": 1, "nombre": "Old"}])).with_delay(300),
        )
        .await;
    backend
        .enqueue_response(MockResponse::success(json!([{"id": 2, "nombre": "New"}])))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "admin");

    let slow = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh_doctors().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(store.refresh_doctors().await.unwrap());
    assert!(!slow.await.unwrap().unwrap());

    let names: Vec<_> = store.cache().doctors().into_iter().map(|d| d.name).collect();
    assert_eq!(names, ["New"]);
}

#[tokio::test]
async fn doctor_writes_require_admin() {
    let backend = MockBackend::start().await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");

    let create = store.create_doctor(doctor(""), None).await.unwrap_err();
    let delete = store.delete_doctor("d1").await.unwrap_err();

    assert!(matches!(create, StoreError::Forbidden { .. }));
    assert!(matches!(delete, StoreError::Forbidden { .. }));
    assert!(backend.captured_requests().await.is_empty());
}

#[tokio::test]
async fn create_doctor_with_credentials() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({
            "id": 12, "nombre": "Eva", "especialidad": "Ortodoncia", "status": "activo"
        })))
        .await;
    backend.enqueue_response(MockResponse::default()).await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "admin");

    let created = store
        .create_doctor(doctor(""), Some(DoctorCredentials::new("eva", "secret")))
        .await
        .unwrap();

    assert_eq!(created.doctor.id, "12");
    assert!(created.credentials_warning.is_none());
    assert!(store.cache().doctor("12").is_some());

    let requests = backend.captured_requests().await;
    assert_eq!(requests[1].path, "/api/usuarios");
    assert_eq!(requests[1].json()["id_doctor"], "12");
    assert_eq!(requests[1].json()["usuario"], "eva");
}

#[tokio::test]
async fn credential_failure_is_a_warning() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({"id": 13, "nombre": "Leo"})))
        .await;
    backend
        .enqueue_response(MockResponse::error(422, "El usuario ya existe"))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "admin");

    let created = store
        .create_doctor(doctor(""), Some(DoctorCredentials::new("leo", "pw")))
        .await
        .unwrap();

    let warning = created.credentials_warning.expect("expected a warning");
    assert!(warning.contains("El usuario ya existe"));
    assert!(store.cache().doctor("13").is_some());
}

#[tokio::test]
async fn delete_patient_cascades_after_backend_confirms() {
    let backend = MockBackend::start().await;
    backend.enqueue_response(MockResponse::default()).await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");
    store.cache().set_patients(vec![patient("p1"), patient("p2")]);
    store.cache().add_appointment(appointment("a1", "p1", at(1, 9)));
    store.cache().add_appointment(appointment("a2", "p2", at(1, 10)));

    assert!(store.delete_patient("p1").await.unwrap());

    assert!(store.cache().patient("p1").is_none());
    let ids: Vec<_> = store.cache().appointments().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, ["a2"]);
    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/api/pacientes/p1");
}

#[tokio::test]
async fn rejected_patient_delete_keeps_cache() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(404, "No encontrado"))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");
    store.cache().add_patient(patient("p1"));
    store.cache().add_appointment(appointment("a1", "p1", at(1, 9)));

    assert!(store.delete_patient("p1").await.is_err());

    assert!(store.cache().patient("p1").is_some());
    assert_eq!(store.cache().appointments().len(), 1);
}

#[tokio::test]
async fn create_patient_without_backend_id_gets_local_id() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({"name": "Marta", "age": 34})))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");

    let created = store.create_patient(patient("")).await.unwrap();

    assert!(!created.id.is_empty());
    assert!(store.cache().patient(&created.id).is_some());
}

#[tokio::test]
async fn logout_survives_backend_failure() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(500, "Server Error"))
        .await;
    let (storage, store) = logged_in_store(&backend.base_url(), "doctor");

    assert!(store.logout().await);

    assert!(!store.session().is_authenticated());
    assert!(storage.peek(keys::USER_TOKEN).is_none());
    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/api/logout");
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok-test"));
}

#[tokio::test]
async fn scheduled_appointment_copies_patient_name() {
    let backend = MockBackend::start().await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "doctor");
    store.cache().add_patient(patient("p1"));

    let booked = store.schedule_appointment("p1", at(20, 10), "Limpieza");

    assert_eq!(booked.patient_name, "Patient p1");
    assert_eq!(store.cache().appointments_for_patient("p1"), vec![booked]);
    assert!(backend.captured_requests().await.is_empty());
}

#[tokio::test]
async fn verify_session_returns_current_user() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::json(r#"{"id": "u1", "nombre": "Test User", "rol": "admin"}"#))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "admin");

    let user = store.verify_session().await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(backend.captured_requests().await[0].path, "/api/user");
}

#[tokio::test]
async fn late_unauthorized_does_not_clear_a_newer_login() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::error(401, "Unauthenticated.").with_delay(300))
        .await;
    let (storage, store) = logged_in_store(&backend.base_url(), "doctor");

    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh_patients().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.session().login(
        UserRecord::new("b", "Bea", "doctor"),
        AuthToken::new("tok-b"),
    ));

    let err = pending.await.unwrap().unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert_eq!(store.session().user().unwrap().id, "b");
    assert_eq!(storage.peek(keys::USER_TOKEN).as_deref(), Some("tok-b"));
}

#[tokio::test]
async fn created_doctor_without_backend_id_gets_local_id() {
    let backend = MockBackend::start().await;
    backend
        .enqueue_response(MockResponse::success(json!({"nombre": "Eva"})))
        .await;
    let (_storage, store) = logged_in_store(&backend.base_url(), "admin");

    let created = store.create_doctor(doctor(""), None).await.unwrap();

    assert!(!created.doctor.id.is_empty());
    assert_eq!(store.cache().doctor(&created.doctor.id), Some(created.doctor));
}
