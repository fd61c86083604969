// Domain-layer modules and shared errors/models
pub mod validator {
    pub use crate::validator::*;
}

pub mod store {
    pub use crate::store::*;
}

pub mod query {
    pub use crate::query::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
