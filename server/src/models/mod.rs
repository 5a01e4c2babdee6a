pub mod account;
pub mod bill;
pub mod confirmation;
pub mod food;
pub mod seat;
pub mod showtime;
pub mod ticket;
pub mod voucher;

pub use account::{Account, MembershipTier};
pub use bill::{BookingAck, BookingRequest, TicketLine};
pub use confirmation::BookingConfirmation;
pub use food::{FoodItem, FoodLine, FoodSelection};
pub use seat::{Seat, SeatKey, SeatKeyError, SeatState, SeatType};
pub use showtime::Showtime;
pub use ticket::Ticket;
pub use voucher::{Promotional, PromotionalBenefit, Voucher, VoucherState};
