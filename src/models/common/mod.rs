pub mod filters;
pub mod import;
pub mod optional;
pub mod pagination;
pub mod refs;
pub mod response;

pub use filters::FilterOptions;
pub use import::{ImportResult, ImportRowError};
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use refs::{NamedRef, UserBrief};
pub use response::ApiResponse;
