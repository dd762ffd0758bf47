#![deny(unsafe_code)]

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use govtoken_core::{
    Address, Amount, CommitError, GovernedToken, JournalEntry, OfficerSeat, OperationReceipt,
    PersistentToken, Role, SnapshotStoreConfig, StoreError, TokenConfig, TokenError, TokenEvent,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub token: TokenConfig,
    pub deployer: Address,
    pub store: SnapshotStoreConfig,
}

impl ServiceConfig {
    /// Default token parameters, in-memory state.
    pub fn new(deployer: Address) -> Self {
        Self {
            token: TokenConfig::default(),
            deployer,
            store: SnapshotStoreConfig::Memory,
        }
    }
}

/// Shared handle to the single token instance. The mutex serializes every
/// operation so each one observes the committed result of the previous.
#[derive(Clone)]
pub struct ServiceState {
    pub token: Arc<Mutex<PersistentToken>>,
}

impl ServiceState {
    pub fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        let ServiceConfig {
            token,
            deployer,
            store,
        } = config;
        let host = PersistentToken::bootstrap(store, &token, deployer)?;
        info!(
            backend = host.backend_label(),
            symbol = host.token().symbol(),
            owner = %host.token().owner(),
            "Token host ready"
        );

        Ok(Self {
            token: Arc::new(Mutex::new(host)),
        })
    }

    /// Run one mutation against the token and persist the outcome.
    pub async fn commit<F>(&self, operation: F) -> Result<OperationReceipt, ApiError>
    where
        F: FnOnce(&mut GovernedToken) -> Result<OperationReceipt, TokenError>,
    {
        let mut host = self.token.lock().await;
        Ok(host.commit(operation)?)
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/token", get(token_info))
        .route("/v1/balances/:address", get(balance))
        .route("/v1/allowances/:owner/:spender", get(allowance))
        .route("/v1/roles/:role/:address", get(role_membership))
        .route("/v1/events", get(list_events))
        .route("/v1/transfer", post(transfer))
        .route("/v1/transfer-from", post(transfer_from))
        .route("/v1/approve", post(approve))
        .route("/v1/approvals/increase", post(increase_approval))
        .route("/v1/approvals/decrease", post(decrease_approval))
        .route("/v1/mint", post(mint))
        .route("/v1/mint/finish", post(finish_minting))
        .route("/v1/burn", post(burn))
        .route("/v1/pause", post(pause))
        .route("/v1/unpause", post(unpause))
        .route("/v1/officers/:seat", post(set_officer))
        .route("/v1/superuser/transfer", post(transfer_superuser))
        .route("/v1/ownership/transfer", post(transfer_ownership))
        .route("/v1/destroy", post(destroy))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("token host error: {0}")]
    Commit(#[from] CommitError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Token(err) => token_status(err),
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Token(err) => err.kind(),
            ApiError::Store(_) => "storage",
        }
    }
}

impl From<CommitError> for ApiError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Token(err) => Self::Token(err),
            CommitError::Store(err) => Self::Store(err),
        }
    }
}

fn token_status(err: &TokenError) -> StatusCode {
    match err {
        TokenError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        TokenError::InvalidAddress(_)
        | TokenError::UnknownRole(_)
        | TokenError::UnknownOfficerSeat(_) => StatusCode::BAD_REQUEST,
        TokenError::InsufficientBalance { .. }
        | TokenError::InsufficientAllowance { .. }
        | TokenError::ArithmeticOverflow
        | TokenError::ArithmeticUnderflow => StatusCode::UNPROCESSABLE_ENTITY,
        TokenError::ContractPaused
        | TokenError::AlreadyPaused
        | TokenError::NotPaused
        | TokenError::MintingFinished => StatusCode::CONFLICT,
        TokenError::ContractDestroyed => StatusCode::GONE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string(), "code": self.code() });
        (status, Json(body)).into_response()
    }
}

// Body and path parsing failures all surface as 400 with the same error shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    Ok(raw.parse::<Address>()?)
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    storage_backend: &'static str,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let host = state.token.lock().await;
    Json(HealthResponse {
        status: "ok",
        service: "govtoken-service",
        storage_backend: host.backend_label(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub paused: bool,
    pub minting_finished: bool,
    pub destroyed: bool,
    pub contract_address: Address,
    pub owner: Address,
    pub ceo: Address,
    pub cfo: Address,
    pub coo: Address,
}

async fn token_info(State(state): State<ServiceState>) -> Json<TokenInfoResponse> {
    let host = state.token.lock().await;
    let token = host.token();
    Json(TokenInfoResponse {
        name: token.name().to_string(),
        symbol: token.symbol().to_string(),
        decimals: token.decimals(),
        total_supply: token.total_supply(),
        paused: token.paused(),
        minting_finished: token.minting_finished(),
        destroyed: token.destroyed(),
        contract_address: token.contract_address(),
        owner: token.owner(),
        ceo: token.ceo(),
        cfo: token.cfo(),
        coo: token.coo(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: Amount,
}

async fn balance(
    Path(address): Path<String>,
    State(state): State<ServiceState>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = parse_address(&address)?;
    let host = state.token.lock().await;
    Ok(Json(BalanceResponse {
        address,
        balance: host.token().balance_of(&address),
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    pub allowance: Amount,
}

async fn allowance(
    Path((owner, spender)): Path<(String, String)>,
    State(state): State<ServiceState>,
) -> Result<Json<AllowanceResponse>, ApiError> {
    let owner = parse_address(&owner)?;
    let spender = parse_address(&spender)?;
    let host = state.token.lock().await;
    Ok(Json(AllowanceResponse {
        owner,
        spender,
        allowance: host.token().allowance(&owner, &spender),
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMembershipResponse {
    pub role: Role,
    pub address: Address,
    pub granted: bool,
}

async fn role_membership(
    Path((role, address)): Path<(String, String)>,
    State(state): State<ServiceState>,
) -> Result<Json<RoleMembershipResponse>, ApiError> {
    let role = role.parse::<Role>()?;
    let address = parse_address(&address)?;
    let host = state.token.lock().await;
    Ok(Json(RoleMembershipResponse {
        role,
        address,
        granted: host.token().has_role(role, &address),
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct EventsQuery {
    operation: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub chain_valid: bool,
    pub total: usize,
    pub returned: usize,
    pub items: Vec<JournalEntry>,
}

async fn list_events(
    State(state): State<ServiceState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let mut host = state.token.lock().await;
    let chain_valid = host.verify_journal();
    let journal = host.token().journal();

    let mut entries = match query.operation.as_deref() {
        Some(operation_id) => journal.operation(operation_id),
        None => journal.entries().iter().collect::<Vec<_>>(),
    };

    let order = query
        .order
        .as_deref()
        .unwrap_or("desc")
        .to_ascii_lowercase();
    if order == "desc" {
        entries.reverse();
    } else if order != "asc" {
        return Err(ApiError::bad_request(format!(
            "invalid order '{}'; expected asc or desc",
            order
        )));
    }

    let total = entries.len();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);
    let items = entries
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect::<Vec<_>>();
    let returned = items.len();

    Ok(Json(EventsResponse {
        chain_valid,
        total,
        returned,
        items,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub ok: bool,
    pub operation_id: String,
    pub events: Vec<TokenEvent>,
}

impl From<OperationReceipt> for MutationResponse {
    fn from(receipt: OperationReceipt) -> Self {
        Self {
            ok: true,
            operation_id: receipt.operation_id,
            events: receipt.events,
        }
    }
}

type MutationResult = Result<Json<MutationResponse>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct TransferRequest {
    caller: Address,
    to: Address,
    amount: Amount,
}

async fn transfer(
    State(state): State<ServiceState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.transfer(&request.caller, request.to, request.amount))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct TransferFromRequest {
    caller: Address,
    from: Address,
    to: Address,
    amount: Amount,
}

async fn transfer_from(
    State(state): State<ServiceState>,
    payload: Result<Json<TransferFromRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| {
            token.transfer_from(&request.caller, request.from, request.to, request.amount)
        })
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct ApproveRequest {
    caller: Address,
    spender: Address,
    amount: Amount,
}

async fn approve(
    State(state): State<ServiceState>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.approve(&request.caller, request.spender, request.amount))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct ApprovalDeltaRequest {
    caller: Address,
    spender: Address,
    delta: Amount,
}

async fn increase_approval(
    State(state): State<ServiceState>,
    payload: Result<Json<ApprovalDeltaRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.increase_approval(&request.caller, request.spender, request.delta))
        .await?;
    Ok(Json(receipt.into()))
}

async fn decrease_approval(
    State(state): State<ServiceState>,
    payload: Result<Json<ApprovalDeltaRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.decrease_approval(&request.caller, request.spender, request.delta))
        .await?;
    Ok(Json(receipt.into()))
}

async fn mint(
    State(state): State<ServiceState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.mint(&request.caller, request.to, request.amount))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct CallerRequest {
    caller: Address,
}

async fn finish_minting(
    State(state): State<ServiceState>,
    payload: Result<Json<CallerRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.finish_minting(&request.caller))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct BurnRequest {
    caller: Address,
    who: Address,
    amount: Amount,
}

async fn burn(
    State(state): State<ServiceState>,
    payload: Result<Json<BurnRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.burn(&request.caller, request.who, request.amount))
        .await?;
    Ok(Json(receipt.into()))
}

async fn pause(
    State(state): State<ServiceState>,
    payload: Result<Json<CallerRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state.commit(|token| token.pause(&request.caller)).await?;
    Ok(Json(receipt.into()))
}

async fn unpause(
    State(state): State<ServiceState>,
    payload: Result<Json<CallerRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state.commit(|token| token.unpause(&request.caller)).await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct OfficerRequest {
    caller: Address,
    address: Address,
}

async fn set_officer(
    Path(seat): Path<String>,
    State(state): State<ServiceState>,
    payload: Result<Json<OfficerRequest>, JsonRejection>,
) -> MutationResult {
    let seat = seat.parse::<OfficerSeat>()?;
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.set_officer(&request.caller, seat, request.address))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct SuperuserTransferRequest {
    caller: Address,
    new_superuser: Address,
}

async fn transfer_superuser(
    State(state): State<ServiceState>,
    payload: Result<Json<SuperuserTransferRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.transfer_superuser(&request.caller, request.new_superuser))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct OwnershipTransferRequest {
    caller: Address,
    new_owner: Address,
}

async fn transfer_ownership(
    State(state): State<ServiceState>,
    payload: Result<Json<OwnershipTransferRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.transfer_ownership(&request.caller, request.new_owner))
        .await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct DestroyRequest {
    caller: Address,
    recipient: Address,
}

async fn destroy(
    State(state): State<ServiceState>,
    payload: Result<Json<DestroyRequest>, JsonRejection>,
) -> MutationResult {
    let request = body(payload)?;
    let receipt = state
        .commit(|token| token.destroy(&request.caller, request.recipient))
        .await?;
    Ok(Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;
    use uuid::Uuid;

    const DEPLOYER: &str = "0x0000000000000000000000000000000000000001";
    const ALICE: &str = "0x00000000000000000000000000000000000000a1";
    const BOB: &str = "0x00000000000000000000000000000000000000b0";
    const OUTSIDER: &str = "0x00000000000000000000000000000000000000ee";

    fn deployer() -> Address {
        DEPLOYER.parse().unwrap()
    }

    fn memory_app() -> Router {
        let state = ServiceState::bootstrap(ServiceConfig::new(deployer())).unwrap();
        build_router(state)
    }

    fn post(uri: &str, payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn transfer_endpoint_moves_balance_and_reports_events() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/transfer",
                serde_json::json!({ "caller": DEPLOYER, "to": ALICE, "amount": 250 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: MutationResponse = read_json(response).await;
        assert!(body.ok);
        assert_eq!(
            body.events,
            vec![TokenEvent::Transfer {
                from: deployer(),
                to: ALICE.parse().unwrap(),
                value: 250,
            }]
        );

        let response = app
            .oneshot(get(&format!("/v1/balances/{}", ALICE)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: BalanceResponse = read_json(response).await;
        assert_eq!(body.balance, 250);
    }

    #[tokio::test]
    async fn token_errors_map_to_http_status_and_code() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/mint",
                serde_json::json!({ "caller": OUTSIDER, "to": OUTSIDER, "amount": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(
            body.get("code").and_then(|v| v.as_str()),
            Some("unauthorized")
        );

        let response = app
            .clone()
            .oneshot(post("/v1/pause", serde_json::json!({ "caller": DEPLOYER })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post(
                "/v1/transfer",
                serde_json::json!({ "caller": DEPLOYER, "to": BOB, "amount": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(post(
                "/v1/transfer-from",
                serde_json::json!({ "caller": BOB, "from": DEPLOYER, "to": BOB, "amount": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn insufficient_balance_is_unprocessable() {
        let app = memory_app();
        let response = app
            .oneshot(post(
                "/v1/transfer",
                serde_json::json!({ "caller": ALICE, "to": BOB, "amount": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(
            body.get("code").and_then(|v| v.as_str()),
            Some("insufficient_balance")
        );
    }

    #[tokio::test]
    async fn malformed_input_is_a_bad_request() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(get("/v1/balances/not-an-address"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(post(
                "/v1/transfer",
                serde_json::json!({ "caller": "0x12", "to": BOB, "amount": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(
            body.get("code").and_then(|v| v.as_str()),
            Some("bad_request")
        );

        let response = app
            .clone()
            .oneshot(post(
                "/v1/officers/cto",
                serde_json::json!({ "caller": DEPLOYER, "address": ALICE }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get("/v1/events?order=sideways"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn officer_assignment_shows_in_token_info() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/officers/ceo",
                serde_json::json!({ "caller": DEPLOYER, "address": ALICE }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/v1/token")).await.unwrap();
        let info: TokenInfoResponse = read_json(response).await;
        assert_eq!(info.ceo, ALICE.parse::<Address>().unwrap());
        assert_eq!(info.owner, deployer());
        assert_eq!(info.total_supply, 10_000_000_000);
        assert!(!info.paused);
    }

    #[tokio::test]
    async fn events_endpoint_filters_by_operation() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/burn",
                serde_json::json!({ "caller": DEPLOYER, "who": DEPLOYER, "amount": 10 }),
            ))
            .await
            .unwrap();
        let receipt: MutationResponse = read_json(response).await;

        let response = app
            .oneshot(get(&format!(
                "/v1/events?operation={}&order=asc",
                receipt.operation_id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page: EventsResponse = read_json(response).await;
        assert!(page.chain_valid);
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].event.name(), "burn");
        assert_eq!(page.items[1].event.name(), "transfer");
    }

    #[tokio::test]
    async fn unlimited_allowance_survives_the_wire() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/approve",
                serde_json::json!({ "caller": DEPLOYER, "spender": BOB, "amount": u64::MAX }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post(
                "/v1/approvals/increase",
                serde_json::json!({ "caller": DEPLOYER, "spender": BOB, "delta": u64::MAX }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let receipt: MutationResponse = read_json(response).await;
        let expected = u128::from(u64::MAX) * 2;
        assert_eq!(
            receipt.events,
            vec![TokenEvent::Approval {
                owner: deployer(),
                spender: BOB.parse().unwrap(),
                value: expected,
            }]
        );

        let response = app.oneshot(get("/v1/events?limit=1")).await.unwrap();
        let page: EventsResponse = read_json(response).await;
        assert!(page.chain_valid);
        assert_eq!(page.items[0].event, receipt.events[0]);
    }

    #[tokio::test]
    async fn destroyed_token_answers_gone() {
        let app = memory_app();

        let response = app
            .clone()
            .oneshot(post(
                "/v1/destroy",
                serde_json::json!({ "caller": DEPLOYER, "recipient": BOB }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post(
                "/v1/approve",
                serde_json::json!({ "caller": DEPLOYER, "spender": BOB, "amount": 5 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn file_backed_state_survives_restart() {
        let path = std::env::temp_dir()
            .join(format!("govtoken-service-{}", Uuid::new_v4()))
            .join("state.json");
        let config = ServiceConfig {
            token: TokenConfig::default(),
            deployer: deployer(),
            store: SnapshotStoreConfig::file(path.clone()),
        };

        let app = build_router(ServiceState::bootstrap(config.clone()).unwrap());
        let response = app
            .oneshot(post(
                "/v1/superuser/transfer",
                serde_json::json!({ "caller": DEPLOYER, "new_superuser": ALICE }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(path.exists());

        let app = build_router(ServiceState::bootstrap(config).unwrap());
        let response = app
            .clone()
            .oneshot(get(&format!("/v1/roles/superuser/{}", ALICE)))
            .await
            .unwrap();
        let membership: RoleMembershipResponse = read_json(response).await;
        assert!(membership.granted);

        let response = app
            .oneshot(get(&format!("/v1/roles/superuser/{}", DEPLOYER)))
            .await
            .unwrap();
        let membership: RoleMembershipResponse = read_json(response).await;
        assert!(!membership.granted);
    }
}
