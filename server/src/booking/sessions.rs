//! In-process registry of live booking flows.
//!
//! Flows are not persisted; a restart drops them, and idle flows are swept
//! after the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::flow::BookingFlow;

#[derive(Clone)]
pub struct SessionRegistry {
    flows: Arc<RwLock<HashMap<Uuid, BookingFlow>>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            flows: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn is_live(&self, flow: &BookingFlow, now: DateTime<Utc>) -> bool {
        flow.updated_at + self.idle_ttl > now
    }

    pub async fn insert(&self, flow: BookingFlow) -> Uuid {
        let id = flow.id;
        self.flows.write().await.insert(id, flow);
        id
    }

    pub async fn get(&self, id: Uuid, now: DateTime<Utc>) -> Option<BookingFlow> {
        let flows = self.flows.read().await;
        flows.get(&id).filter(|flow| self.is_live(flow, now)).cloned()
    }

    /// Runs `f` against a live flow and refreshes its idle timer when `f`
    /// succeeds. Returns `None` if the flow is unknown or idle too long.
    pub async fn update<T, E>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut BookingFlow) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut flows = self.flows.write().await;
        let flow = flows.get_mut(&id).filter(|flow| self.is_live(flow, now))?;

        let result = f(flow);
        if result.is_ok() {
            flow.updated_at = now;
        }
        Some(result)
    }

    pub async fn remove(&self, id: Uuid) -> Option<BookingFlow> {
        self.flows.write().await.remove(&id)
    }

    /// Drops idle flows and returns them so their holds can be released.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Vec<BookingFlow> {
        let mut flows = self.flows.write().await;
        let idle: Vec<Uuid> = flows
            .values()
            .filter(|flow| !self.is_live(flow, now) && !flow.submitting)
            .map(|flow| flow.id)
            .collect();

        idle.iter().filter_map(|id| flows.remove(id)).collect()
    }

    pub async fn len(&self) -> usize {
        self.flows.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::flow::FlowError;
    use crate::models::Showtime;
    use chrono::{NaiveDate, NaiveTime};

    fn flow(now: DateTime<Utc>) -> BookingFlow {
        let showtime = Showtime {
            showtime_id: 1,
            room_id: 1,
            movie_id: 1,
            start_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        };
        BookingFlow::new(&showtime, "0900000000", now)
    }

    #[tokio::test]
    async fn idle_flows_are_invisible_and_swept() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let start = Utc::now();
        let id = registry.insert(flow(start)).await;

        assert!(registry.get(id, start + Duration::minutes(29)).await.is_some());
        assert!(registry.get(id, start + Duration::minutes(31)).await.is_none());

        let swept = registry.sweep(start + Duration::minutes(31)).await;
        assert_eq!(swept.len(), 1);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn successful_update_refreshes_idle_timer() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let start = Utc::now();
        let id = registry.insert(flow(start)).await;

        let later = start + Duration::minutes(20);
        let result = registry
            .update(id, later, |f| f.select_seats(Vec::new()))
            .await;
        assert_eq!(result, Some(Ok(())));
        assert!(registry.get(id, start + Duration::minutes(45)).await.is_some());

        let failed: Option<Result<_, FlowError>> = registry.update(id, start + Duration::minutes(46), |f| f.advance()).await;
        assert_eq!(failed, Some(Err(FlowError::NoSeatsSelected)));
    }

    #[tokio::test]
    async fn unknown_flow_yields_none() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let result: Option<Result<(), FlowError>> =
            registry.update(Uuid::new_v4(), Utc::now(), |_| Ok(())).await;
        assert!(result.is_none());
    }
}
