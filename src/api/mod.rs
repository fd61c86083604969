// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod webhook_handler {
    pub use crate::webhook_handler::*;
}

pub mod crm_handler {
    pub use crate::crm_handler::*;
}

pub mod routes {
    pub use crate::routes::*;
}
