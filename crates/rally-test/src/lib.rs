//! Rally calendar server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `rally_test::` paths.

pub mod component {
    pub use rally_recur as recur;
    pub use rally_service::{calendar, codec, record, store};

    // Re-export config from both core and app
    pub mod config {
        pub use rally_app::config::ConfigHandler;
        pub use rally_core::config::*;
    }

    pub mod error {
        pub use rally_app::error::{AppError, AppResult, ErrorResponse};
        pub use rally_core::error::{CoreError, CoreResult};
        pub use rally_service::error::{ServiceError, ServiceResult};
    }

    pub mod handler {
        pub use rally_app::calendar_handler::{CalendarServiceHandler, get_calendar_from_depot};
    }
}

// Re-export top-level modules for convenience
pub mod app {
    pub mod api {
        pub use rally_app::app::api::*;
    }
}
