use crate::errors::Result;

/// Key/value metadata attached to a dataset object, grouped in domains.
///
/// The empty string names the default domain.
pub trait Metadata {
    fn metadata_item(&self, key: &str, domain: &str) -> Option<String>;

    fn set_metadata_item(&mut self, key: &str, value: &str, domain: &str) -> Result<()>;
}
