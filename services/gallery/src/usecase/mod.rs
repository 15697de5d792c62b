pub mod album;
pub mod otp;
pub mod share;
