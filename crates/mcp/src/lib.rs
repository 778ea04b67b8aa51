pub mod server;
pub mod settings;
pub mod tools;
pub mod transport;

pub use server::McpServer;
pub use settings::Settings;
