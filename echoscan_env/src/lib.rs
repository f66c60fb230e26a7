//! EchoScan Environment Boundary
//!
//! Everything the core treats as an external collaborator lives here:
//! - Time (`ScanClock`): wall clock in production, manual clock in tests
//!   and headless runs
//! - Line decoding (`decode_line`): one text line from the sensor into a
//!   `RawReading`
//! - Hand-off (`reading_channel`): a single-producer / single-consumer
//!   queue from the I/O thread to the tick loop
//!
//! # Example
//!
//! ```ignore
//! use echoscan_env::{decode_line, reading_channel};
//!
//! let (tx, mut rx) = reading_channel(256);
//! std::thread::spawn(move || {
//!     for line in serial_lines() {
//!         if let Ok(reading) = decode_line(&line) {
//!             if tx.blocking_send(reading).is_err() {
//!                 break;
//!             }
//!         }
//!     }
//! });
//!
//! loop {
//!     while let Some(r) = rx.try_recv()? {
//!         engine.submit_reading(r.distance_cm, r.heading_deg, r.state.as_deref(), clock.now_secs());
//!     }
//!     render(engine.snapshot(clock.now_secs()));
//! }
//! ```

mod channel;
mod clock;
mod decode;
mod error;
mod types;

pub use channel::{reading_channel, ReadingReceiver, ReadingSender};
pub use clock::{ManualClock, ScanClock, SystemClock};
pub use decode::decode_line;
pub use error::EnvError;
pub use types::RawReading;
