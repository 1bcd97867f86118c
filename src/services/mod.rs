//! Probe registry: every probe implementation the engine knows about.

mod altcensored;
mod distributed_youtube_archive;
mod filmot;
mod ghostarchive;
mod hackint_ya;
mod hobune;
mod ia_cdx_thumbs;
mod ia_details;
mod ia_wayback;
mod letsplayindex;
mod nyaneonline;
mod odysee;
mod playboard;
mod preservetube;
mod removededm;
mod youtube;

use std::sync::Arc;

use crate::probe::Probe;

/// All probes the engine can run, in a fixed order. Order only affects the
/// order results are emitted in when the caller doesn't sort them.
pub fn all_probes() -> Vec<Arc<dyn Probe>> {
    vec![
        Arc::new(youtube::YouTube),
        Arc::new(ghostarchive::GhostArchive),
        Arc::new(altcensored::AltCensored),
        Arc::new(nyaneonline::NyaneOnline),
        Arc::new(preservetube::PreserveTube),
        Arc::new(ia_wayback::WaybackMachine),
        Arc::new(ia_details::ArchiveOrgDetails),
        Arc::new(ia_cdx_thumbs::ArchiveOrgCdxThumbs),
        Arc::new(hackint_ya::HackintYa),
        Arc::new(distributed_youtube_archive::DistributedYoutubeArchive),
        Arc::new(hobune::Hobune),
        Arc::new(removededm::RemovedEdm),
        Arc::new(filmot::Filmot),
        Arc::new(playboard::Playboard),
        Arc::new(odysee::Odysee),
        Arc::new(letsplayindex::LetsPlayIndex),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_probe_has_a_unique_classname() {
        let probes = all_probes();
        let mut seen = std::collections::HashSet::new();
        for probe in &probes {
            assert!(seen.insert(probe.classname()), "duplicate classname {}", probe.classname());
        }
    }

    #[test]
    fn every_probe_has_a_unique_config_key() {
        let probes = all_probes();
        let mut seen = std::collections::HashSet::new();
        for probe in &probes {
            assert!(seen.insert(probe.config_key()), "duplicate config key {}", probe.config_key());
        }
    }
}
