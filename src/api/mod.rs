//! Webhook request handling

pub mod dispatcher;
pub mod event_handler;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;

// Re-export the main entry points for convenience
pub use dispatcher::WebhookDispatcher;
pub use handler::function_handler as handler;
pub use helpers::HttpResponse;
pub use parsing::WebhookRequest;
