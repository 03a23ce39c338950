pub mod form;
pub mod list_fetcher;
pub mod portal;
pub mod query_sync;
pub mod resource;
pub mod schema;
pub mod session_store;

pub use form::{FormMode, FormSubmitter, SubmitOutcome};
pub use list_fetcher::{ListFetcher, ListOutcome, ListParams, ListQuery};
pub use portal::{FilterOptions, HomePage, Portal};
pub use query_sync::{History, Navigator, QueryStateSync};
pub use resource::Resource;
