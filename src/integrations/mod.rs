//! External service integrations.

pub mod notion_client {
    pub use crate::notion_client::*;
}

pub mod crm_models {
    pub use crate::crm_models::*;
}
