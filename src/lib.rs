pub mod argv;
pub mod async_dispatch;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;

pub use dispatcher::{Dispatcher, TimeoutAction, dispatch};
pub use error::DispatchError;
pub use models::{Invocation, ResultCode};
