//! YouTube Data API search client and response types.

mod search;
mod types;

pub use search::{SearchClient, SearchParams, SEARCH_URL};
pub use types::{PageInfo, SearchItem, SearchResponse, Snippet, Thumbnail, Thumbnails, VideoId};
