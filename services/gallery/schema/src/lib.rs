//! sea-orm entities for the gallery service.

pub mod album_shares;
pub mod albums;
pub mod events;
pub mod guests;
pub mod otp_challenges;
