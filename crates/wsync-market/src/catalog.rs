use tracing::info;
use wsync_reconcile::OfferCatalog;

use crate::pagination::PageStep;
use crate::{MarketError, Marketplace};

/// Page through a marketplace catalog and collect every offer identifier.
///
/// Pages are requested strictly one after another, each with the cursor the
/// previous page returned. Any page failure aborts the whole fetch; a partial
/// catalog is never returned.
pub async fn fetch_all_offer_ids(market: &dyn Marketplace) -> Result<OfferCatalog, MarketError> {
    let mut catalog = OfferCatalog::new();
    let mut cursor = String::new();
    let mut accumulated = 0usize;
    let mut pages = 0u32;

    loop {
        pages += 1;
        let page = market.fetch_catalog_page(&cursor).await?;
        accumulated += page.offer_ids.len();
        info!(
            target_name = market.name(),
            page = pages,
            items = page.offer_ids.len(),
            accumulated,
            "catalog page received"
        );

        let step = market.termination().next_step(&page, accumulated);
        for id in page.offer_ids {
            catalog.insert(id);
        }

        match step {
            PageStep::Done => break,
            PageStep::Continue(next) => {
                if next == cursor {
                    return Err(MarketError::DataShape(format!(
                        "{} catalog pagination stuck: cursor '{}' repeated",
                        market.name(),
                        next
                    )));
                }
                cursor = next;
            }
        }
    }

    info!(
        target_name = market.name(),
        pages,
        offers = catalog.len(),
        "catalog fetched"
    );
    Ok(catalog)
}
