// src/collect.rs
//
// Batch collection loop. Walks pending tenders, fetches each result
// announcement through the source seam, extracts the fact and hands
// successful ones to the sink. Throttled so the portal never sees a
// burst; a failed fetch skips the tender rather than aborting the run.

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::consts::{COLLECT_BATCH_SIZE, REQUEST_PAUSE_MS};
use crate::scrape::{ResultFact, extract_result_fact};
use crate::source::TenderSource;

/// A tender waiting for its result to be collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTender {
    pub tender_id: String,
    pub registration_number: String,
}

/// Extraction output paired with the tender it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedResult {
    pub tender_id: String,
    pub registration_number: String,
    pub fact: ResultFact,
}

/// Process up to one batch of pending tenders. Returns how many results
/// reached the sink. Facts that fail the usability gate are dropped with
/// a warning; the caller re-queues them on a later pass if desired.
pub fn collect_results(
    source: &dyn TenderSource,
    pending: &[PendingTender],
    sink: &mut dyn FnMut(CollectedResult),
) -> usize {
    collect_throttled(
        source,
        pending,
        Duration::from_millis(REQUEST_PAUSE_MS),
        sink,
    )
}

fn collect_throttled(
    source: &dyn TenderSource,
    pending: &[PendingTender],
    pause: Duration,
    sink: &mut dyn FnMut(CollectedResult),
) -> usize {
    let mut collected = 0;
    let mut failed = 0;

    for (i, tender) in pending.iter().take(COLLECT_BATCH_SIZE).enumerate() {
        if i > 0 {
            thread::sleep(pause);
        }

        let html = match source.fetch_announcement_html(&tender.tender_id) {
            Ok(html) => html,
            Err(e) => {
                warn!(tender_id = %tender.tender_id, error = %e, "fetch failed, skipping");
                failed += 1;
                continue;
            }
        };

        let Some(fact) = extract_result_fact(&html) else {
            warn!(tender_id = %tender.tender_id, "empty announcement, skipping");
            failed += 1;
            continue;
        };

        for warning in &fact.warnings {
            warn!(tender_id = %tender.tender_id, %warning, "extraction warning");
        }

        if !fact.is_success {
            warn!(tender_id = %tender.tender_id, "no usable result fields, skipping");
            failed += 1;
            continue;
        }

        sink(CollectedResult {
            tender_id: tender.tender_id.clone(),
            registration_number: tender.registration_number.clone(),
            fact,
        });
        collected += 1;
    }

    info!(collected, failed, total = pending.len(), "collection pass finished");
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::collections::HashMap;

    struct FakePortal {
        pages: HashMap<&'static str, &'static str>,
        fetches: std::cell::Cell<usize>,
    }

    impl FakePortal {
        fn new(pages: HashMap<&'static str, &'static str>) -> Self {
            Self { pages, fetches: std::cell::Cell::new(0) }
        }
    }

    impl TenderSource for FakePortal {
        fn fetch_announcement_html(&self, tender_id: &str) -> Result<String, EngineError> {
            self.fetches.set(self.fetches.get() + 1);
            self.pages
                .get(tender_id)
                .map(|s| s.to_string())
                .ok_or_else(|| EngineError::Source(format!("no page for {tender_id}")))
        }
    }

    fn pending(id: &str) -> PendingTender {
        PendingTender {
            tender_id: id.to_string(),
            registration_number: format!("2025/{id}"),
        }
    }

    const GOOD_PAGE: &str = "<table>\
        <tr><td>Yüklenici</td><td>Örnek İnşaat A.Ş.</td></tr>\
        <tr><td>Sözleşme Bedeli</td><td>1.250.000,00 TL</td></tr>\
        <tr><td>Teklif Veren İstekli Sayısı</td><td>5</td></tr>\
        </table>";

    // No winner, no amount: fails the usability gate.
    const USELESS_PAGE: &str = "<table>\
        <tr><td>İhale Kayıt No</td><td>2025/12345</td></tr>\
        </table>";

    #[test]
    fn collects_good_skips_failed_and_useless() {
        let portal =
            FakePortal::new(HashMap::from([("t1", GOOD_PAGE), ("t3", USELESS_PAGE), ("t4", "   ")]));
        let pending = vec![pending("t1"), pending("t2"), pending("t3"), pending("t4")];

        let mut seen = Vec::new();
        let n = collect_throttled(&portal, &pending, Duration::ZERO, &mut |r| seen.push(r));

        assert_eq!(n, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tender_id, "t1");
        assert_eq!(seen[0].registration_number, "2025/t1");
        assert_eq!(seen[0].fact.winner_company.as_deref(), Some("Örnek İnşaat A.Ş."));
        assert_eq!(seen[0].fact.number_of_bidders, 5);
    }

    #[test]
    fn respects_batch_size() {
        // No pages, so every fetch fails; only the batch bound matters.
        let portal = FakePortal::new(HashMap::new());
        let many: Vec<PendingTender> =
            (0..COLLECT_BATCH_SIZE + 50).map(|i| pending(&i.to_string())).collect();

        let mut count = 0usize;
        collect_throttled(&portal, &many, Duration::ZERO, &mut |_| count += 1);
        assert_eq!(count, 0);
        assert_eq!(portal.fetches.get(), COLLECT_BATCH_SIZE);
    }
}
