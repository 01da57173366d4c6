// petkit-api: Async Rust client for the PetKit cloud API

pub mod account;
pub mod credentials;
pub mod error;
pub mod region;
pub mod response;
pub mod session;

pub use account::{Account, Params, RequestKind, DEVICE_ROSTER_ENDPOINT, LOGIN_ENDPOINT};
pub use credentials::Credentials;
pub use error::Error;
pub use region::Region;
pub use session::Session;
