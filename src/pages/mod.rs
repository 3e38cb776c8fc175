pub mod login;
pub mod products;
pub mod session;

pub use login::LoginPage;
pub use products::ProductsPage;
pub use session::PageSession;
