pub mod content_service;
pub mod housekeeping;
pub mod notifier;
pub mod subscription_service;
