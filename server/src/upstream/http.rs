use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{CinemaBackend, UpstreamError};
use crate::models::{Account, BookingAck, BookingRequest, FoodItem, Seat, Showtime, Ticket, Voucher};

/// `CinemaBackend` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpCinemaBackend {
    client: Client,
    base_url: Url,
}

impl HttpCinemaBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url).map_err(|e| UpstreamError::Request(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Request(format!("invalid base url: {base_url}")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Appends `segments` to the base path, percent-encoding each one so a
    /// caller-supplied value stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Request(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        resource: &'static str,
        id: &str,
    ) -> Result<T, UpstreamError> {
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| UpstreamError::Decode(e.to_string())),
            StatusCode::NOT_FOUND => Err(UpstreamError::NotFound {
                resource,
                id: id.to_string(),
            }),
            status => {
                let message = response.text().await.unwrap_or_default();
                tracing::warn!(%status, path = %path, "Cinema backend request failed");
                Err(UpstreamError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Lookup by a caller-supplied key. Dot segments would be dropped by the
    /// URL builder and address the collection instead, so they never exist.
    async fn get_by_key<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        resource: &'static str,
    ) -> Result<T, UpstreamError> {
        if key.is_empty() || key == "." || key == ".." {
            return Err(UpstreamError::NotFound {
                resource,
                id: key.to_string(),
            });
        }
        let url = self.endpoint(&[collection, key])?;
        self.get_json(url, &[], resource, key).await
    }
}

#[async_trait]
impl CinemaBackend for HttpCinemaBackend {
    async fn seats_for_room(&self, room_id: i64) -> Result<Vec<Seat>, UpstreamError> {
        let url = self.endpoint(&["seats"])?;
        self.get_json(url, &[("room_id", room_id.to_string())], "room", &room_id.to_string())
            .await
    }

    async fn tickets_for_showtime(&self, showtime_id: i64) -> Result<Vec<Ticket>, UpstreamError> {
        let url = self.endpoint(&["tickets"])?;
        self.get_json(
            url,
            &[("showtime_id", showtime_id.to_string())],
            "showtime",
            &showtime_id.to_string(),
        )
        .await
    }

    async fn showtime(&self, showtime_id: i64) -> Result<Showtime, UpstreamError> {
        self.get_by_key("showtimes", &showtime_id.to_string(), "showtime")
            .await
    }

    async fn voucher(&self, code: &str) -> Result<Voucher, UpstreamError> {
        self.get_by_key("vouchers", code, "voucher").await
    }

    async fn foods(&self) -> Result<Vec<FoodItem>, UpstreamError> {
        let url = self.endpoint(&["foods"])?;
        self.get_json(url, &[], "foods", "all").await
    }

    async fn account(&self, phone_number: &str) -> Result<Account, UpstreamError> {
        self.get_by_key("accounts", phone_number, "account").await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, UpstreamError> {
        let response = self
            .client
            .post(self.endpoint(&["bookings"])?)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<BookingAck>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
