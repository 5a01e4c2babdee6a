//! Pure booking core: seat layout, availability, pricing, the step-by-step
//! booking flow, and membership tiers. Nothing in here performs I/O.

pub mod availability;
pub mod flow;
pub mod layout;
pub mod membership;
pub mod pricing;
pub mod sessions;

pub use availability::{SeatMap, SeatStatus, Unavailability};
pub use flow::{BookingFlow, BookingStep, FlowError};
pub use layout::{LayoutError, LayoutSource, RoomLayout, SeatDescriptor, SeatGrid, SeatPricing};
pub use membership::{MembershipStatus, TierThresholds};
pub use pricing::{PriceQuote, PricedSeat};
pub use sessions::SessionRegistry;
