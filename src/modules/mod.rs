pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod cache;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod repository_memory;
    pub mod lifecycle;
    pub mod query;
    pub mod service;
    pub mod handle;
    pub mod route;
}
