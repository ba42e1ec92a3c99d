use crate::commands::Out;
use crate::model::Catalog;
use crate::{CatalogDisplay, Config};

/// Lists the denominations available in the configured catalog.
pub fn catalog(config: &Config) -> Out<Catalog> {
    let catalog = config.catalog().clone();
    let message = format!(
        "{} denominations:\n{}",
        catalog.len(),
        CatalogDisplay(&catalog)
    );
    Out::new(message, catalog)
}
