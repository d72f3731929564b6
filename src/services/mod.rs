pub mod booking_service;
pub mod listing_service;
pub mod render;
pub mod review_service;
pub mod seed_service;

/// How an update payload meets the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// PUT: the payload must carry every required field.
    Replace,
    /// PATCH: absent fields keep their stored values.
    Merge,
}
