pub mod app;
pub mod config;
pub mod error;
pub mod auth {
    pub mod config;
    pub mod gate;
    pub mod jwt;
    pub mod middleware;
    pub mod models;
}
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod repository;
}
pub mod service {
    pub mod cascade;
    pub mod documents;
}
pub mod api {
    pub mod documents;
    pub mod errors;
}
