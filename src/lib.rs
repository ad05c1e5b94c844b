mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod realtime;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod jwt;
    pub mod middleware;
    pub mod session;
}
mod workspace {
    pub mod join;
    pub mod recipes;
    pub mod selector;

    #[cfg(test)]
    pub(crate) mod testing;
}
mod config;
mod constants;

pub use authentication::*;
pub use config::*;
pub use constants::*;
pub use database::*;
pub use workspace::*;
