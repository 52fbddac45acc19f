use crate::error::Result;
use crate::repository::http::{HttpLineSource, HttpTransport};
use crate::repository::{LineSource, Transport};
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn create_line_source() -> Result<Arc<dyn LineSource>> {
        let client = HttpLineSource::new()?;
        Ok(Arc::new(client))
    }

    pub fn create_transport(show_progress: bool) -> Result<Arc<dyn Transport>> {
        let client = HttpTransport::new(show_progress)?;
        Ok(Arc::new(client))
    }
}
