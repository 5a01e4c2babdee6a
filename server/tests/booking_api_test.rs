use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use cinema_booking_server::config::Config;
use cinema_booking_server::models::{
    Account, BookingAck, BookingRequest, FoodItem, Promotional, PromotionalBenefit, Seat, SeatState,
    SeatType, Showtime, Ticket, Voucher, VoucherState,
};
use cinema_booking_server::routes::create_routes;
use cinema_booking_server::state::AppState;
use cinema_booking_server::store::{BookingStore, MemoryBookingStore};
use cinema_booking_server::upstream::{CinemaBackend, UpstreamError};

#[derive(Default)]
struct FakeBackend {
    showtimes: HashMap<i64, Showtime>,
    seats: HashMap<i64, Vec<Seat>>,
    tickets: Mutex<HashMap<i64, Vec<Ticket>>>,
    vouchers: Mutex<HashMap<String, Voucher>>,
    foods: Vec<FoodItem>,
    accounts: HashMap<String, Account>,
    reject_bookings: AtomicBool,
    bookings: Mutex<Vec<BookingRequest>>,
}

#[async_trait]
impl CinemaBackend for FakeBackend {
    async fn seats_for_room(&self, room_id: i64) -> Result<Vec<Seat>, UpstreamError> {
        Ok(self.seats.get(&room_id).cloned().unwrap_or_default())
    }

    async fn tickets_for_showtime(&self, showtime_id: i64) -> Result<Vec<Ticket>, UpstreamError> {
        Ok(self.tickets.lock().unwrap().get(&showtime_id).cloned().unwrap_or_default())
    }

    async fn showtime(&self, showtime_id: i64) -> Result<Showtime, UpstreamError> {
        self.showtimes
            .get(&showtime_id)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                resource: "showtime",
                id: showtime_id.to_string(),
            })
    }

    async fn voucher(&self, code: &str) -> Result<Voucher, UpstreamError> {
        self.vouchers.lock().unwrap().get(code).cloned().ok_or(UpstreamError::NotFound {
            resource: "voucher",
            id: code.to_string(),
        })
    }

    async fn foods(&self) -> Result<Vec<FoodItem>, UpstreamError> {
        Ok(self.foods.clone())
    }

    async fn account(&self, phone_number: &str) -> Result<Account, UpstreamError> {
        self.accounts
            .get(phone_number)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                resource: "account",
                id: phone_number.to_string(),
            })
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, UpstreamError> {
        if self.reject_bookings.load(Ordering::SeqCst) {
            return Err(UpstreamError::Rejected {
                status: 500,
                message: "payment backend unavailable".to_string(),
            });
        }
        let mut bookings = self.bookings.lock().unwrap();
        bookings.push(request.clone());
        Ok(BookingAck {
            bill_id: 1000 + bookings.len() as i64,
        })
    }
}

fn showtime(showtime_id: i64, room_id: i64) -> Showtime {
    Showtime {
        showtime_id,
        room_id,
        movie_id: 1,
        start_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
    }
}

fn ticket(ticket_id: i64, showtime_id: i64, seat_row: char, seat_column: u16) -> Ticket {
    Ticket {
        ticket_id,
        bill_id: ticket_id,
        showtime_id,
        room_id: 1,
        seat_row,
        seat_column,
        price: Decimal::from(75_000),
        purchased_at: None,
        expires_at: None,
    }
}

fn voucher(code: &str, state: VoucherState, benefit: PromotionalBenefit) -> Voucher {
    Voucher {
        code: code.to_string(),
        state,
        valid_from: Utc::now() - Duration::days(1),
        valid_until: Utc::now() + Duration::days(1),
        promotional: Promotional {
            promotional_id: 1,
            name: code.to_string(),
            benefit,
        },
    }
}

fn fake_backend() -> FakeBackend {
    let save20 = PromotionalBenefit::Discount {
        percent_reduce: Decimal::from(20),
        max_price_can_reduce: Decimal::from(80_000),
    };

    FakeBackend {
        showtimes: [(1, showtime(1, 1)), (2, showtime(2, 2))].into_iter().collect(),
        seats: [(
            2,
            vec![
                Seat {
                    room_id: 2,
                    seat_row: 'A',
                    seat_column: 1,
                    seat_type: SeatType::Vip,
                    state: SeatState::Available,
                    price: Decimal::from(120_000),
                },
                Seat {
                    room_id: 2,
                    seat_row: 'A',
                    seat_column: 2,
                    seat_type: SeatType::Vip,
                    state: SeatState::Unavailable,
                    price: Decimal::from(120_000),
                },
            ],
        )]
        .into_iter()
        .collect(),
        tickets: Mutex::new([(1, vec![ticket(1, 1, 'A', 1)])].into_iter().collect()),
        vouchers: Mutex::new(
            [
                ("SAVE20".to_string(), voucher("SAVE20", VoucherState::Active, save20.clone())),
                ("USED".to_string(), voucher("USED", VoucherState::Used, save20)),
            ]
            .into_iter()
            .collect(),
        ),
        foods: vec![
            FoodItem {
                food_id: 1,
                name: "Popcorn".to_string(),
                price: Decimal::from(45_000),
            },
            FoodItem {
                food_id: 2,
                name: "Coke".to_string(),
                price: Decimal::from(30_000),
            },
        ],
        accounts: [(
            "0901234567".to_string(),
            Account {
                phone_number: "0901234567".to_string(),
                full_name: Some("Nguyen Van A".to_string()),
                membership_points: 6_200,
            },
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    }
}

struct TestApp {
    router: Router,
    backend: Arc<FakeBackend>,
    store: Arc<MemoryBookingStore>,
}

fn test_app() -> TestApp {
    test_app_with(Config::default())
}

fn test_app_with(config: Config) -> TestApp {
    let backend = Arc::new(fake_backend());
    let store = Arc::new(MemoryBookingStore::new());
    let state = AppState::new(config, backend.clone(), store.clone());
    TestApp {
        router: create_routes(state),
        backend,
        store,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn start_booking(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/bookings",
                Some(json!({ "showtime_id": 1, "phone_number": "0901234567" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["session"]["id"].as_str().unwrap().to_string()
    }

    /// Starts a session, selects `seats`, and walks it to the payment step.
    async fn booking_at_payment(&self, seats: Value) -> String {
        let id = self.start_booking().await;
        let base = format!("/api/bookings/{id}");

        let (status, _) = self
            .send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": seats })))
            .await;
        assert_eq!(status, StatusCode::OK);
        self.send(Method::POST, &format!("{base}/continue"), None).await;
        let (_, body) = self.send(Method::POST, &format!("{base}/continue"), None).await;
        assert_eq!(body["data"]["session"]["step"], "payment");
        id
    }

    fn submitted_bookings(&self) -> usize {
        self.backend.bookings.lock().unwrap().len()
    }
}

fn amount(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_check_sets_security_headers() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn seat_map_marks_ticketed_seats_as_booked() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api/showtimes/1/seats", None).await;

    assert_eq!(status, StatusCode::OK);
    let map = &body["data"];
    assert_eq!(map["available_count"], 99);
    assert_eq!(map["booked_count"], 1);
    assert_eq!(map["seats"][0]["seat"], "A1");
    assert_eq!(map["seats"][0]["reason"], "ticketed");
    assert_eq!(map["seats"][99]["seat_type"], "couple");
}

#[tokio::test]
async fn defined_room_seats_override_generated_grid() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api/showtimes/2/seats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available_count"], 1);
    assert_eq!(body["data"]["seats"][1]["reason"], "out_of_service");
}

#[tokio::test]
async fn unknown_showtime_is_not_found() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api/showtimes/99/seats", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn quote_applies_capped_voucher_to_seats_and_food() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/quotes",
            Some(json!({
                "showtime_id": 1,
                "seats": ["B1", "J1"],
                "foods": [{ "food_id": 1, "quantity": 2 }],
                "voucher_code": "SAVE20"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let quote = &body["data"];
    assert_eq!(amount(&quote["ticket_subtotal"]), Decimal::from(225_000));
    assert_eq!(amount(&quote["food_subtotal"]), Decimal::from(90_000));
    assert_eq!(amount(&quote["discount"]), Decimal::from(63_000));
    assert_eq!(amount(&quote["total"]), Decimal::from(252_000));
    assert_eq!(quote["total_display"], "252.000 ₫");
}

#[tokio::test]
async fn used_voucher_is_rejected() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/quotes",
            Some(json!({ "showtime_id": 1, "seats": ["B1"], "voucher_code": "USED" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = app.send(Method::GET, "/api/vouchers/USED", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["usable"], false);
}

#[tokio::test]
async fn membership_tier_is_derived_from_points() {
    let app = test_app();
    let (status, body) = app
        .send(Method::GET, "/api/accounts/0901234567/membership", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tier"], "diamond");
    assert_eq!(body["data"]["points_to_next_tier"], 3_800);
}

#[tokio::test]
async fn full_booking_flow_issues_confirmation() {
    let app = test_app();
    let id = app.start_booking().await;
    let base = format!("/api/bookings/{id}");

    let (status, _) = app.send(Method::POST, &format!("{base}/continue"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["A1"] })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["seats"], json!(["A1"]));

    let (status, body) = app
        .send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["B1", "B2"] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&body["data"]["quote"]["ticket_subtotal"]), Decimal::from(150_000));

    let (_, body) = app.send(Method::POST, &format!("{base}/continue"), None).await;
    assert_eq!(body["data"]["session"]["step"], "food");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("{base}/foods"),
            Some(json!({ "foods": [{ "food_id": 2, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&body["data"]["quote"]["subtotal"]), Decimal::from(180_000));

    let (status, body) = app
        .send(Method::PUT, &format!("{base}/voucher"), Some(json!({ "code": "SAVE20" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&body["data"]["quote"]["total"]), Decimal::from(144_000));

    let (_, body) = app.send(Method::POST, &format!("{base}/continue"), None).await;
    assert_eq!(body["data"]["session"]["step"], "payment");

    let (status, body) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let confirmation = &body["data"];
    assert_eq!(confirmation["seat_count"], 2);
    assert_eq!(amount(&confirmation["total"]), Decimal::from(144_000));
    assert_eq!(amount(&confirmation["discount"]), Decimal::from(36_000));

    let submitted = app.backend.bookings.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].total_price, Decimal::from(144_000));
    assert_eq!(submitted[0].voucher_code.as_deref(), Some("SAVE20"));

    let confirmation_id = confirmation["id"].as_str().unwrap();
    let (status, body) = app
        .send(Method::GET, &format!("/api/confirmations/{confirmation_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["seats"], json!(["B1", "B2"]));

    assert!(app.store.active_holds(1, Utc::now()).await.unwrap().is_empty());
    let (status, _) = app.send(Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn held_seats_block_other_sessions() {
    let app = test_app();
    let first = app.start_booking().await;
    let second = app.start_booking().await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/bookings/{first}/seats"),
            Some(json!({ "seats": ["C3", "C4"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/bookings/{second}/seats"),
            Some(json!({ "seats": ["C4", "C5"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["seats"], json!(["C4"]));

    let (_, body) = app.send(Method::GET, "/api/showtimes/1/seats", None).await;
    assert_eq!(body["data"]["available_count"], 97);

    let (_, body) = app
        .send(Method::GET, &format!("/api/showtimes/1/seats?session_id={first}"), None)
        .await;
    assert_eq!(body["data"]["available_count"], 99);

    let (status, _) = app.send(Method::DELETE, &format!("/api/bookings/{first}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/bookings/{second}/seats"),
            Some(json!({ "seats": ["C4", "C5"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rejected_booking_keeps_session_and_issues_no_confirmation() {
    let app = test_app();
    app.backend.reject_bookings.store(true, Ordering::SeqCst);

    let id = app.start_booking().await;
    let base = format!("/api/bookings/{id}");
    app.send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["D1"] })))
        .await;
    app.send(Method::POST, &format!("{base}/continue"), None).await;
    app.send(Method::POST, &format!("{base}/continue"), None).await;

    let (status, body) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["step"], "payment");
    assert_eq!(app.store.active_holds(1, Utc::now()).await.unwrap().len(), 1);

    app.backend.reject_bookings.store(false, Ordering::SeqCst);
    let (status, _) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn seats_cannot_change_after_leaving_seat_step() {
    let app = test_app();
    let id = app.start_booking().await;
    let base = format!("/api/bookings/{id}");

    app.send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["E1"] })))
        .await;
    app.send(Method::POST, &format!("{base}/continue"), None).await;

    let (status, body) = app
        .send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["E2"] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = app.send(Method::POST, &format!("{base}/back"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["step"], "seats");
}

#[tokio::test]
async fn sweeper_drops_idle_sessions_and_their_holds() {
    use cinema_booking_server::booking::BookingFlow;
    use cinema_booking_server::services::maintenance::sweep_once;
    use cinema_booking_server::store::HoldRequest;

    let backend = Arc::new(fake_backend());
    let store = Arc::new(MemoryBookingStore::new());
    let config = Config {
        session_ttl: Duration::zero(),
        ..Config::default()
    };
    let state = AppState::new(config, backend, store.clone());

    let now = Utc::now();
    let flow = BookingFlow::new(&showtime(1, 1), "0901234567", now);
    let id = state.sessions.insert(flow).await;
    store
        .place_hold(HoldRequest {
            session_id: id,
            showtime_id: 1,
            seats: vec!["F1".parse().unwrap()],
            now,
            expires_at: now + Duration::minutes(10),
        })
        .await
        .unwrap();

    sweep_once(&state).await;

    assert_eq!(state.sessions.len().await, 0);
    assert!(store.active_holds(1, Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_food_ids_are_merged_without_overflow() {
    let app = test_app();
    let id = app.start_booking().await;
    let base = format!("/api/bookings/{id}");
    app.send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["D5"] })))
        .await;
    app.send(Method::POST, &format!("{base}/continue"), None).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("{base}/foods"),
            Some(json!({ "foods": [
                { "food_id": 1, "quantity": u32::MAX },
                { "food_id": 1, "quantity": 2 }
            ] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app.send(Method::GET, &base, None).await;
    assert_eq!(body["data"]["session"]["foods"], json!([]));

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("{base}/foods"),
            Some(json!({ "foods": [
                { "food_id": 1, "quantity": 2 },
                { "food_id": 1, "quantity": 3 }
            ] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["foods"][0]["quantity"], 5);
    assert_eq!(amount(&body["data"]["quote"]["food_subtotal"]), Decimal::from(225_000));
}

#[tokio::test]
async fn rejected_reselection_keeps_previous_holds() {
    let app = test_app();
    let first = app.start_booking().await;
    let second = app.start_booking().await;

    let (status, _) = app
        .send(Method::PUT, &format!("/api/bookings/{first}/seats"), Some(json!({ "seats": ["B2"] })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/bookings/{first}/seats"),
            Some(json!({ "seats": ["C1", "C1"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app.send(Method::GET, &format!("/api/bookings/{first}"), None).await;
    assert_eq!(body["data"]["session"]["seats"][0]["seat"], "B2");

    let (status, body) = app
        .send(Method::PUT, &format!("/api/bookings/{second}/seats"), Some(json!({ "seats": ["B2"] })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["seats"], json!(["B2"]));

    let holds = app.store.active_holds(1, Utc::now()).await.unwrap();
    assert_eq!(holds.len(), 1);
    assert_eq!(holds[0].seat.to_string(), "B2");
    assert_eq!(holds[0].session_id.to_string(), first);
}

#[tokio::test]
async fn checkout_rechecks_seats_ticketed_after_selection() {
    let app = test_app();
    let id = app.booking_at_payment(json!(["G3"])).await;
    let base = format!("/api/bookings/{id}");

    app.backend
        .tickets
        .lock()
        .unwrap()
        .entry(1)
        .or_default()
        .push(ticket(2, 1, 'G', 3));

    let (status, body) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["seats"], json!(["G3"]));
    assert_eq!(app.submitted_bookings(), 0);

    let (status, body) = app.send(Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["step"], "payment");
}

#[tokio::test]
async fn checkout_fails_when_a_lapsed_hold_was_taken_over() {
    use cinema_booking_server::store::HoldRequest;

    let app = test_app_with(Config {
        hold_ttl: Duration::zero(),
        ..Config::default()
    });
    let id = app.booking_at_payment(json!(["G4"])).await;

    let now = Utc::now();
    app.store
        .place_hold(HoldRequest {
            session_id: uuid::Uuid::new_v4(),
            showtime_id: 1,
            seats: vec!["G4".parse().unwrap()],
            now,
            expires_at: now + Duration::minutes(10),
        })
        .await
        .unwrap();

    let (status, body) = app
        .send(Method::POST, &format!("/api/bookings/{id}/checkout"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["seats"], json!(["G4"]));
    assert_eq!(app.submitted_bookings(), 0);
}

#[tokio::test]
async fn voucher_used_before_checkout_is_not_submitted() {
    let app = test_app();
    let id = app.start_booking().await;
    let base = format!("/api/bookings/{id}");

    app.send(Method::PUT, &format!("{base}/seats"), Some(json!({ "seats": ["H1"] })))
        .await;
    app.send(Method::POST, &format!("{base}/continue"), None).await;
    let (status, _) = app
        .send(Method::PUT, &format!("{base}/voucher"), Some(json!({ "code": "SAVE20" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    app.send(Method::POST, &format!("{base}/continue"), None).await;

    app.backend
        .vouchers
        .lock()
        .unwrap()
        .get_mut("SAVE20")
        .unwrap()
        .state = VoucherState::Used;

    let (status, body) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.submitted_bookings(), 0);

    let (_, body) = app.send(Method::GET, &base, None).await;
    assert_eq!(body["data"]["session"]["step"], "payment");

    let (status, _) = app.send(Method::DELETE, &format!("{base}/voucher"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::POST, &format!("{base}/checkout"), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let submitted = app.backend.bookings.lock().unwrap().clone();
    assert_eq!(submitted[0].voucher_code, None);
    assert_eq!(submitted[0].total_price, Decimal::from(75_000));
}
