use classclash_common::{Bundle, Location, UnitEntry};
use tracing::debug;

/// Flattens a bundle into location-tagged entries: top-level units first,
/// then the units of every nested archive in archive order.
///
/// Duplicate names within one bundle are kept as separate entries.
pub fn collect_entries(bundle: &dyn Bundle) -> Vec<UnitEntry> {
    let archive_units: usize = bundle.archives().iter().map(|a| a.units().len()).sum();
    let mut entries = Vec::with_capacity(bundle.units().len() + archive_units);

    for unit in bundle.units() {
        entries.push(UnitEntry::new(unit.clone(), Location::TopLevel));
    }

    for archive in bundle.archives() {
        for unit in archive.units() {
            entries.push(UnitEntry::new(
                unit.clone(),
                Location::InArchive(archive.clone()),
            ));
        }
    }

    debug!(
        "Collected {} entries from {} ({} top-level, {} archives)",
        entries.len(),
        bundle.display_name(),
        bundle.units().len(),
        bundle.archives().len()
    );

    entries
}
