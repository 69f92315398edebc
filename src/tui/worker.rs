//! Background request threads
//!
//! Each search request and each image probe runs on its own thread and
//! reports back over one channel. Nothing is cancelled; the view decides
//! whether a late message still applies.

use crate::api::{RecommendResponse, Recommender};
use crate::card::ImageStatus;
use crate::view::SearchTicket;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread;

/// Messages from background threads
pub enum BgMessage {
    SearchComplete {
        id: u64,
        outcome: crate::Result<RecommendResponse>,
    },
    ImageProbed {
        generation: u64,
        index: usize,
        status: ImageStatus,
    },
}

/// Run one recommendation request off the UI thread
pub fn spawn_search(
    recommender: Arc<dyn Recommender>,
    ticket: SearchTicket,
    tx: Sender<BgMessage>,
) {
    thread::spawn(move || {
        let outcome = recommender.recommend(&ticket.request);
        let _ = tx.send(BgMessage::SearchComplete {
            id: ticket.id,
            outcome,
        });
    });
}

/// Probe every pending image of one result set, each independently
pub fn spawn_image_probes(
    recommender: Arc<dyn Recommender>,
    generation: u64,
    images: Vec<(usize, String)>,
    tx: Sender<BgMessage>,
) {
    for (index, url) in images {
        let recommender = Arc::clone(&recommender);
        let tx = tx.clone();
        thread::spawn(move || {
            let status = match recommender.probe_image(&url) {
                Ok(()) => ImageStatus::Loaded,
                Err(e) => {
                    tracing::debug!(target: "tui", index, url = %url, error = %e, "image probe failed");
                    ImageStatus::Failed
                }
            };
            let _ = tx.send(BgMessage::ImageProbed {
                generation,
                index,
                status,
            });
        });
    }
}
