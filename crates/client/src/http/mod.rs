mod client;
mod response;
mod url_builder;

pub use client::PrismicHttpClient;
