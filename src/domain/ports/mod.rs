mod http_client_port;
mod image_cache_port;
mod image_processor_port;

pub use http_client_port::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use image_cache_port::{
    CacheEntry, CacheError, CacheResult, Claim, ClaimPolicy, FetchHandle, FetchOutcome,
    ImageCaching,
};
pub use image_processor_port::ImageProcessor;
