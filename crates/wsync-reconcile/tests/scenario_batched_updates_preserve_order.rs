use wsync_reconcile::*;

#[test]
fn scenario_2500_stock_updates_split_2000_then_500() {
    let known: OfferCatalog = (0..2500).map(|i| format!("SKU-{i:05}")).collect();
    let stocks = build_stock_updates(&[], &known, &StockShape::default()).unwrap();

    let batches: Vec<&[StockUpdate]> = chunk(&stocks, 2000).unwrap().collect();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 2000);
    assert_eq!(batches[1].len(), 500);
    assert_eq!(batches[0][0].offer_id, "SKU-00000");
    assert_eq!(batches[1][0].offer_id, "SKU-02000");
    assert_eq!(batches[1][499].offer_id, "SKU-02499");
}

#[test]
fn scenario_chunking_is_restartable() {
    let items: Vec<u32> = (0..5).collect();
    let first: Vec<Vec<u32>> = chunk(&items, 2).unwrap().map(<[u32]>::to_vec).collect();
    let second: Vec<Vec<u32>> = chunk(&items, 2).unwrap().map(<[u32]>::to_vec).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![vec![0, 1], vec![2, 3], vec![4]]);
}
