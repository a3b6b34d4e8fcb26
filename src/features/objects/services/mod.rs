mod bucket_service;

pub use bucket_service::BucketService;
