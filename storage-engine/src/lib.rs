mod moka_client;

pub use moka_client::InProcessClient;
