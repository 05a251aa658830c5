pub mod factory;
pub mod gate;
pub mod token;
pub mod unauthorized;
pub mod validator;

pub use gate::{AuthGate, CachingAuthGate, Gate, GateBuilder};
pub use unauthorized::{UnauthorizedHandler, default_unauthorized_handler};
pub use validator::{RemoteValidator, TokenEncoding, ValidatorOptions};
