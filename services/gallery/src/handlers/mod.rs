pub mod albums;
pub mod health;
pub mod otp;
pub mod session;
pub mod shares;
pub mod viewer;
