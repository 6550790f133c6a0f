pub mod db;
pub mod mailer;
pub mod memory;
pub mod tokens;

pub use db::DbAdapter;
pub use mailer::LogMailer;
pub use memory::MemoryAdapter;
pub use tokens::HmacTokenService;
