mod auth;
mod store;

pub use auth::DeviceLink;
pub use auth::LinkPresenter;
pub use auth::LoginOutcome;
pub use auth::SessionManager;
pub use store::SessionStore;
