//!
//! Documentation of the booking module.
//! Everything between a submitted booking form and a stored booking.
//!

pub mod booking;
