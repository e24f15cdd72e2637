pub mod client;

pub use client::HttpTemplateApi;
