// Library root: CSV-over-HTTP ingestion plumbing shared by the club crates.
//
// Data flows one way: transport -> parse -> cache -> consumer feed. Nothing in
// here knows about table tennis; domain normalization lives downstream.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod rows;
pub mod scalar;
pub mod source;
pub mod timestamp;
pub mod transport;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FetchError, ParseError, TransportError};
pub use feed::{Feed, FeedState, Fetched};
pub use rows::CsvRow;
pub use scalar::Scalar;
pub use source::{CsvSnapshot, CsvSource, LoadOptions};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, StaticTransport};
