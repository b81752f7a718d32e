// handlers/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints. Responses carry an access/refresh JWT pair.

pub mod login;    // POST /api/token/ - authenticate and get tokens
pub mod refresh;  // POST /api/token/refresh/ - new access token
pub mod register; // POST /api/register/ - create new account

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
