use crate::args::TallyArgs;
use crate::commands::Out;
use crate::{Config, Result, Session, Summary};
use anyhow::bail;
use tracing::debug;

/// Adds up the stamps given in `args` and compares them with the target, if one was given.
///
/// # Errors
/// Returns an error if a stamp id is not in the catalog.
pub fn tally(config: &Config, args: &TallyArgs) -> Result<Out<Summary>> {
    let mut session = Session::new(config.catalog().clone());
    for spec in args.stamps() {
        if !session.catalog().contains(spec.id()) {
            bail!(
                "Unknown denomination '{}'. Run 'stamps catalog' to see the available ids.",
                spec.id()
            );
        }
        session.add_n(spec.id(), spec.count());
        debug!("Added {} x {}", spec.count(), spec.id());
    }
    if let Some(target) = args.target() {
        session.set_target(target);
    }
    let summary = session.summary();
    Ok(Out::new(summary.to_string(), summary))
}
