use wsync_reconcile::*;

fn catalog(ids: &[&str]) -> OfferCatalog {
    ids.iter().copied().collect()
}

#[test]
fn scenario_feed_and_catalog_yield_expected_updates() {
    let known = catalog(&["A", "B", "C"]);
    let remnants = vec![
        RemnantRecord::new("A", ">10", "100.00 x"),
        RemnantRecord::new("B", "1", "50.00 x"),
    ];

    let r = reconcile(&remnants, &known, &StockShape::default(), "RUB").unwrap();

    let stocks: Vec<(&str, i64)> = r
        .stocks
        .iter()
        .map(|s| (s.offer_id.as_str(), s.count))
        .collect();
    assert_eq!(stocks, vec![("A", 100), ("B", 0), ("C", 0)]);

    let prices: Vec<(&str, &str)> = r
        .prices
        .iter()
        .map(|p| (p.offer_id.as_str(), p.price.as_str()))
        .collect();
    assert_eq!(prices, vec![("A", "100"), ("B", "50")]);
    assert!(r.prices.iter().all(|p| p.currency == "RUB"));

    assert_eq!(r.report.matched, 2);
    assert_eq!(r.report.missing_from_feed, 1);
    assert_eq!(r.report.in_stock, 1);
}

#[test]
fn scenario_split_builders_agree_with_combined_pass() {
    let known = catalog(&["A", "B", "C"]);
    let remnants = vec![
        RemnantRecord::new("C", "4", "1'200.00 руб."),
        RemnantRecord::new("A", "2", "300.00 руб."),
    ];
    let shape = StockShape::warehouse("77");

    let combined = reconcile(&remnants, &known, &shape, "RUR").unwrap();
    let stocks = build_stock_updates(&remnants, &known, &shape).unwrap();
    let prices = build_price_updates(&remnants, &known, "RUR").unwrap();

    assert_eq!(stocks, combined.stocks);
    assert_eq!(prices, combined.prices);
    assert_eq!(stocks[0].offer_id, "C");
    assert_eq!(stocks[0].warehouse.as_deref(), Some("77"));
    assert_eq!(prices[0].price, "1200");
}
