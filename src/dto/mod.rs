pub mod bookings;
pub mod listings;
pub mod reviews;
pub mod users;
