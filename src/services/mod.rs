//! Service operations
//!
//! Each service runs its work through the shared [`ApiErrorHandler`](crate::error::ApiErrorHandler),
//! so every failure comes back as one [`CloudSaveError`](crate::CloudSaveError) and
//! calls are rejected locally while a rate-limit window is open.

pub mod batch;
pub mod custom_data;
pub mod pagination;
pub mod player_data;
pub mod player_files;

pub use custom_data::CustomDataService;
pub use pagination::{CursorStrategy, Page, PaginationHelper};
pub use player_data::PlayerDataService;
pub use player_files::PlayerFilesService;
