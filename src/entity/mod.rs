pub mod bookings;
pub mod listings;
pub mod reviews;
pub mod users;

pub use bookings::Entity as Bookings;
pub use listings::Entity as Listings;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
