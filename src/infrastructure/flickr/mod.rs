//! Flickr photo service client.

mod client;
mod dto;

pub use client::{FLICKR_API_BASE, FlickrClient, parse_items};
