//! wsync-market
//!
//! Marketplace side of the sync: catalog pagination, bulk stock/price
//! dispatch, and the concrete Ozon Seller and Yandex Market adapters.
//!
//! Calls are issued one at a time; nothing here runs requests concurrently or
//! retries them. Timeouts are whatever the underlying HTTP client defaults to.

pub mod catalog;
pub mod dispatch;
pub mod marketplace;
pub mod ozon;
pub mod pagination;
pub mod yandex;

pub use catalog::fetch_all_offer_ids;
pub use dispatch::{dispatch_prices, dispatch_stocks, push_price, push_stock, DispatchSummary};
pub use marketplace::{Ack, BatchLimits, CatalogPage, MarketError, Marketplace};
pub use ozon::OzonSeller;
pub use pagination::{NextTokenTermination, PageStep, PageTermination, RunningTotalTermination};
pub use yandex::YandexMarket;
