#![allow(dead_code)]

use axum::Router;
use chrono::NaiveDate;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use shiftswap_axum::{
    auth::{sign_access_token, EmployeeRole},
    models::ShiftAssignment,
    startup::build_router,
    store::MemorySwapStore,
    AppConfig, AppState, MetricsState,
};

pub const SECRET: &str = "integration_test_secret_key";

pub const ALICE: i32 = 1;
pub const BOB: i32 = 2;
pub const CAROL: i32 = 3;
pub const MANAGER: i32 = 99;

pub struct TestApp {
    pub state: Arc<AppState>,
    pub store: Arc<MemorySwapStore>,
    pub router: Router,
    pub alice_slot: Uuid,
    pub alice_second_slot: Uuid,
    pub bob_slot: Uuid,
    pub carol_slot: Uuid,
}

pub async fn assign(store: &MemorySwapStore, employee_id: i32, day: u32) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_assignment(ShiftAssignment {
            id,
            slot_id: Uuid::new_v4(),
            employee_id,
            date: NaiveDate::from_ymd_opt(2026, 11, day).expect("valid date"),
            shift_type: "EARLY".to_string(),
            active: true,
        })
        .await;
    id
}

pub async fn test_app(auto_complete: bool) -> TestApp {
    let store = Arc::new(MemorySwapStore::new());
    let alice_slot = assign(&store, ALICE, 2).await;
    let alice_second_slot = assign(&store, ALICE, 9).await;
    let bob_slot = assign(&store, BOB, 3).await;
    let carol_slot = assign(&store, CAROL, 4).await;

    let mut config = AppConfig::in_memory(SECRET);
    config.auto_complete_swaps = auto_complete;

    let state = Arc::new(AppState::new(
        config,
        store.clone(),
        Arc::new(MetricsState::detached()),
    ));
    let router = build_router(state.clone()).expect("router builds");

    TestApp {
        state,
        store,
        router,
        alice_slot,
        alice_second_slot,
        bob_slot,
        carol_slot,
    }
}

pub fn token(employee_id: i32) -> String {
    sign_access_token(employee_id, EmployeeRole::Employee, SECRET, None, chrono::Duration::minutes(10))
        .expect("token signs")
}

pub fn manager_token(employee_id: i32) -> String {
    sign_access_token(employee_id, EmployeeRole::Manager, SECRET, None, chrono::Duration::minutes(10))
        .expect("token signs")
}

/// Serve the router on an ephemeral port and return its `/api` base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server runs");
    });
    format!("http://{}/api", addr)
}
