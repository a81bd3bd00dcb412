//! Streaming OCR: pages in, pages out, one at a time.
//!
//! [`process_pages`] is an order-preserving transform of a lazy page stream.
//! A page is pulled from the input only after the previous one has been fully
//! recognised, so at most one page's regions, images and cells are alive at
//! any moment and output order always equals input order, whether a page was
//! recognised, skipped or failed.

use crate::engine::LlmOcrModel;
use crate::page::Page;
use crate::timing::Timings;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// A boxed stream of processed pages.
pub type PageStream = Pin<Box<dyn Stream<Item = Page> + Send>>;

/// Run `engine` over `pages`, recording recognition time into `timings`.
///
/// A disabled engine returns the input stream unchanged.
///
/// # Example
/// ```rust,no_run
/// use edgequake_ocr::{process_pages, LlmOcrModel, LlmOcrOptions, Page, Timings};
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = LlmOcrOptions::builder()
///     .api_key("sk-...")
///     .api_url("https://api.openai.com/v1")
///     .model("gpt-4o-mini")
///     .build()?;
/// let engine = LlmOcrModel::new(true, options).await?;
/// let pages = futures::stream::iter(vec![Page::new(0), Page::new(1)]);
/// let mut out = process_pages(&engine, pages, Arc::new(Timings::new()));
/// while let Some(page) = out.next().await {
///     println!("page {}: {} cells", page.page_num(), page.cells.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn process_pages<S>(engine: &LlmOcrModel, pages: S, timings: Arc<Timings>) -> PageStream
where
    S: Stream<Item = Page> + Send + 'static,
{
    if !engine.is_enabled() {
        return Box::pin(pages);
    }

    let engine = engine.clone();
    let s = pages.then(move |page| {
        let engine = engine.clone();
        let timings = Arc::clone(&timings);
        async move { engine.process_page(page, &timings).await }
    });
    Box::pin(s)
}

/// [`process_pages`] over an in-memory sequence.
pub fn process_page_iter<I>(engine: &LlmOcrModel, pages: I, timings: Arc<Timings>) -> PageStream
where
    I: IntoIterator<Item = Page>,
    I::IntoIter: Send + 'static,
{
    process_pages(engine, stream::iter(pages), timings)
}
