//! Universe snapshot loading across listing feeds.

use tracing::{info, warn};

use crate::data_source::UniverseSource;
use crate::pipeline::PipelineError;
use crate::Universe;

/// A snapshot plus the feed failures it survived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedUniverse {
    pub universe: Universe,
    pub warnings: Vec<String>,
}

/// Fetches every feed the source serves, one after the other, and merges them.
///
/// A failing feed is tolerated as long as another one answered. It is fatal
/// only when every feed failed or the merged snapshot is empty.
pub async fn load_universe(source: &dyn UniverseSource) -> Result<LoadedUniverse, PipelineError> {
    let feeds = source.feeds();
    let mut loaded = LoadedUniverse::default();
    let mut answered = 0_usize;

    for feed in &feeds {
        match source.listings(*feed).await {
            Ok(securities) => {
                answered += 1;
                info!(feed = %feed, securities = securities.len(), "listing feed loaded");
                loaded.universe.extend(securities);
            }
            Err(error) => {
                warn!(feed = %feed, error = %error, "listing feed failed");
                loaded
                    .warnings
                    .push(format!("{} {feed} feed failed: {error}", source.id()));
            }
        }
    }

    if answered == 0 {
        return Err(PipelineError::UniverseUnavailable {
            feeds: feeds.len(),
            detail: loaded.warnings.join("; "),
        });
    }
    if loaded.universe.is_empty() {
        return Err(PipelineError::EmptyUniverse);
    }

    Ok(loaded)
}
