pub mod web;

use crate::error::ScanError;
use crate::results::FetchedDocument;
use std::future::Future;

// Base trait for anything that can retrieve a page for scanning
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch the current content of `url`
    ///
    /// Any transport failure is reported as `ScanError::Fetch`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedDocument, ScanError>> + Send;
}
