pub mod portal;

pub use portal::{PortalError, Result};
